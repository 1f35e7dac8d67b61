//! Drug interaction agent
//!
//! Checks every pair of medications in a request against a built-in
//! interaction table and scores the combination.

use crate::coordinator::analysis::{
    AnalysisCategory, AnalysisRequest, CategoryPayload, Interaction, InteractionReport, Severity,
};
use crate::coordinator::{AgentCapability, AgentError};
use async_trait::async_trait;

/// Known interactions: (drug, drug, severity, description)
const INTERACTION_TABLE: &[(&str, &str, Severity, &str)] = &[
    ("warfarin", "aspirin", Severity::Major, "Increased risk of bleeding"),
    (
        "warfarin",
        "ibuprofen",
        Severity::Major,
        "Increased risk of gastrointestinal bleeding",
    ),
    (
        "simvastatin",
        "clarithromycin",
        Severity::Major,
        "Raised statin levels with risk of rhabdomyolysis",
    ),
    ("lisinopril", "spironolactone", Severity::Moderate, "Risk of hyperkalemia"),
    (
        "metformin",
        "contrast",
        Severity::Moderate,
        "Risk of lactic acidosis around iodinated contrast",
    ),
    ("sertraline", "tramadol", Severity::Moderate, "Risk of serotonin syndrome"),
    ("digoxin", "amiodarone", Severity::Moderate, "Raised digoxin levels"),
    (
        "levothyroxine",
        "calcium",
        Severity::Minor,
        "Reduced levothyroxine absorption; separate doses",
    ),
    (
        "omeprazole",
        "clopidogrel",
        Severity::Moderate,
        "Reduced antiplatelet effect of clopidogrel",
    ),
];

/// Score deducted per interaction
fn severity_weight(severity: Severity) -> f64 {
    match severity {
        Severity::Minor => 0.05,
        Severity::Moderate => 0.15,
        Severity::Major => 0.35,
    }
}

/// Table-driven drug interaction checker
#[derive(Debug, Default, Clone)]
pub struct DrugInteractionAgent;

impl DrugInteractionAgent {
    /// Create the agent
    pub fn new() -> Self {
        Self
    }

    /// Find interactions between `medications` and score them
    pub fn check(&self, medications: &[String]) -> InteractionReport {
        let mut normalized: Vec<String> = Vec::new();
        for medication in medications {
            let medication = medication.trim().to_lowercase();
            if !medication.is_empty() && !normalized.contains(&medication) {
                normalized.push(medication);
            }
        }

        let mut interactions = Vec::new();
        for (i, first) in normalized.iter().enumerate() {
            for second in &normalized[i + 1..] {
                if let Some((a, b, severity, description)) = lookup(first, second) {
                    interactions.push(Interaction {
                        drugs: [a.to_string(), b.to_string()],
                        severity,
                        description: description.to_string(),
                    });
                }
            }
        }

        let penalty: f64 = interactions
            .iter()
            .map(|interaction| severity_weight(interaction.severity))
            .sum();

        InteractionReport {
            interactions,
            safety_score: (1.0 - penalty).max(0.0),
        }
    }
}

/// Match a medication pair in either order. Names match on containment so
/// that "aspirin 81mg" still hits "aspirin".
fn lookup(
    first: &str,
    second: &str,
) -> Option<(&'static str, &'static str, Severity, &'static str)> {
    INTERACTION_TABLE
        .iter()
        .find(|(a, b, _, _)| {
            (first.contains(a) && second.contains(b)) || (first.contains(b) && second.contains(a))
        })
        .copied()
}

#[async_trait]
impl AgentCapability for DrugInteractionAgent {
    fn supports(&self, category: AnalysisCategory) -> bool {
        category == AnalysisCategory::DrugInteractions
    }

    async fn analyze(
        &self,
        category: AnalysisCategory,
        request: &AnalysisRequest,
    ) -> Result<CategoryPayload, AgentError> {
        if category != AnalysisCategory::DrugInteractions {
            return Err(AgentError::Unsupported(category));
        }
        Ok(CategoryPayload::DrugInteractions(self.check(&request.medications)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meds(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_no_medications_is_safe() {
        let report = DrugInteractionAgent::new().check(&[]);
        assert!(report.interactions.is_empty());
        assert_eq!(report.safety_score, 1.0);
    }

    #[test]
    fn test_major_interaction_either_order() {
        let agent = DrugInteractionAgent::new();
        let forward = agent.check(&meds(&["Warfarin", "Aspirin 81mg"]));
        let reverse = agent.check(&meds(&["aspirin", "warfarin"]));

        assert_eq!(forward.interactions.len(), 1);
        assert_eq!(forward.interactions[0].severity, Severity::Major);
        assert_eq!(
            forward.interactions[0].drugs,
            ["warfarin".to_string(), "aspirin".to_string()]
        );
        assert_eq!(forward, reverse);
        assert!((forward.safety_score - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_safety_score_floors_at_zero() {
        let report = DrugInteractionAgent::new().check(&meds(&[
            "warfarin",
            "aspirin",
            "ibuprofen",
            "simvastatin",
            "clarithromycin",
        ]));
        assert_eq!(report.interactions.len(), 3);
        assert_eq!(report.safety_score, 0.0);
    }

    #[test]
    fn test_unrelated_medications() {
        let report = DrugInteractionAgent::new().check(&meds(&["amoxicillin", "paracetamol"]));
        assert!(report.interactions.is_empty());
        assert_eq!(report.safety_score, 1.0);
    }
}
