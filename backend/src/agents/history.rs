//! Patient history agent
//!
//! Derives risk factors from the age and condition list of an analysis
//! request using a fixed table of high-risk conditions.

use crate::coordinator::analysis::{
    AnalysisCategory, AnalysisRequest, CategoryPayload, HistoryAssessment,
};
use crate::coordinator::{AgentCapability, AgentError};
use async_trait::async_trait;

/// Age from which advanced age counts as a risk factor
pub const ADVANCED_AGE_YEARS: u32 = 65;

const BASE_CONFIDENCE: f64 = 0.5;
const CONFIDENCE_STEP: f64 = 0.1;
const MAX_CONFIDENCE: f64 = 0.95;

/// Condition keyword -> reported risk factor
const RISK_CONDITIONS: &[(&str, &str)] = &[
    ("diabetes", "diabetes mellitus"),
    ("hypertension", "hypertension"),
    ("smok", "tobacco use"),
    ("copd", "chronic obstructive pulmonary disease"),
    ("kidney", "chronic kidney disease"),
    ("ckd", "chronic kidney disease"),
    ("heart failure", "heart failure"),
    ("atrial fibrillation", "atrial fibrillation"),
    ("obesity", "obesity"),
    ("cancer", "active malignancy"),
    ("stroke", "prior stroke"),
];

/// Rule-based history synthesis agent
#[derive(Debug, Default, Clone)]
pub struct HistoryAgent;

impl HistoryAgent {
    /// Create the agent
    pub fn new() -> Self {
        Self
    }

    /// Assess the history carried by `request`
    pub fn assess(&self, request: &AnalysisRequest) -> HistoryAssessment {
        let mut risk_factors: Vec<String> = Vec::new();
        let mut evidence = 0u32;

        if let Some(age) = request.age {
            evidence += 1;
            if age >= ADVANCED_AGE_YEARS {
                risk_factors.push("advanced age".to_string());
            }
        }

        for condition in &request.conditions {
            let condition = condition.trim().to_lowercase();
            if condition.is_empty() {
                continue;
            }
            evidence += 1;
            for (keyword, factor) in RISK_CONDITIONS {
                if condition.contains(keyword) && !risk_factors.iter().any(|f| f == factor) {
                    risk_factors.push(factor.to_string());
                }
            }
        }

        let confidence =
            (BASE_CONFIDENCE + CONFIDENCE_STEP * f64::from(evidence)).min(MAX_CONFIDENCE);

        HistoryAssessment {
            risk_factors,
            confidence,
        }
    }
}

#[async_trait]
impl AgentCapability for HistoryAgent {
    fn supports(&self, category: AnalysisCategory) -> bool {
        category == AnalysisCategory::History
    }

    async fn analyze(
        &self,
        category: AnalysisCategory,
        request: &AnalysisRequest,
    ) -> Result<CategoryPayload, AgentError> {
        if category != AnalysisCategory::History {
            return Err(AgentError::Unsupported(category));
        }
        Ok(CategoryPayload::History(self.assess(request)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history() {
        let assessment = HistoryAgent::new().assess(&AnalysisRequest::default());
        assert!(assessment.risk_factors.is_empty());
        assert_eq!(assessment.confidence, BASE_CONFIDENCE);
    }

    #[test]
    fn test_age_and_conditions() {
        let request = AnalysisRequest {
            age: Some(72),
            conditions: vec![
                "Type 2 Diabetes".to_string(),
                "Former smoker".to_string(),
                "CKD stage 3".to_string(),
                "chronic kidney disease".to_string(),
            ],
            ..Default::default()
        };
        let assessment = HistoryAgent::new().assess(&request);
        assert_eq!(
            assessment.risk_factors,
            vec![
                "advanced age".to_string(),
                "diabetes mellitus".to_string(),
                "tobacco use".to_string(),
                "chronic kidney disease".to_string(),
            ]
        );
        assert_eq!(assessment.confidence, MAX_CONFIDENCE);
    }

    #[test]
    fn test_young_patient_without_conditions() {
        let request = AnalysisRequest {
            age: Some(30),
            ..Default::default()
        };
        let assessment = HistoryAgent::new().assess(&request);
        assert!(assessment.risk_factors.is_empty());
        assert!((assessment.confidence - 0.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_rejects_other_categories() {
        let result = HistoryAgent::new()
            .analyze(AnalysisCategory::Imaging, &AnalysisRequest::default())
            .await;
        assert_eq!(result, Err(AgentError::Unsupported(AnalysisCategory::Imaging)));
    }
}
