//! Aggregate analysis types
//!
//! The request accepted by `run_aggregate_analysis`, the per-category payloads
//! agents produce, and the envelope returned to callers. Also holds the
//! placeholder payloads and the analysis id clock.

use crate::coordinator::types::iso_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// One slice of an aggregate analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisCategory {
    /// Medical imaging findings
    Imaging,
    /// Patient history risk synthesis
    History,
    /// Drug-drug interaction check
    DrugInteractions,
    /// Supporting literature search
    Research,
}

impl AnalysisCategory {
    /// All categories, in response order
    pub const ALL: [AnalysisCategory; 4] = [
        AnalysisCategory::Imaging,
        AnalysisCategory::History,
        AnalysisCategory::DrugInteractions,
        AnalysisCategory::Research,
    ];

    /// Wire name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisCategory::Imaging => "imaging",
            AnalysisCategory::History => "history",
            AnalysisCategory::DrugInteractions => "drug_interactions",
            AnalysisCategory::Research => "research",
        }
    }

    /// Well-known agent name that owns this category
    pub fn designated_agent(&self) -> &'static str {
        match self {
            AnalysisCategory::Imaging => "monai",
            AnalysisCategory::History => "history",
            AnalysisCategory::DrugInteractions => "drug_checker",
            AnalysisCategory::Research => "research",
        }
    }
}

impl fmt::Display for AnalysisCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Analysis request payload
///
/// The coordinator does not interpret the request; agents read whichever
/// fields they need. Unrecognised fields are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Patient reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    /// Medical image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    /// Patient age in years
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// Known conditions from the patient history
    #[serde(default)]
    pub conditions: Vec<String>,
    /// Current medications
    #[serde(default)]
    pub medications: Vec<String>,
    /// Free-text clinical question
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Any other fields, passed through to agents untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AnalysisRequest {
    /// Short stable hash of the request, used in analysis ids and logs
    pub fn short_hash(&self) -> String {
        let mut hasher = DefaultHasher::new();
        serde_json::to_string(self)
            .unwrap_or_default()
            .hash(&mut hasher);
        format!("{:016x}", hasher.finish())[..8].to_string()
    }
}

/// Interaction severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Monitor only
    Minor,
    /// May need dose adjustment
    Moderate,
    /// Avoid the combination
    Major,
}

/// A single drug-drug interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// The two interacting drugs
    pub drugs: [String; 2],
    /// How serious the interaction is
    pub severity: Severity,
    /// Clinical description
    pub description: String,
}

/// Imaging category payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagingFindings {
    /// Findings reported for the image
    pub findings: Vec<String>,
    /// Confidence in `0.0..=1.0`
    pub confidence: f64,
}

/// History category payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryAssessment {
    /// Risk factors derived from the history
    pub risk_factors: Vec<String>,
    /// Confidence in `0.0..=1.0`
    pub confidence: f64,
}

/// Drug interaction category payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionReport {
    /// Interactions found between the listed medications
    pub interactions: Vec<Interaction>,
    /// Overall safety score in `0.0..=1.0`, higher is safer
    pub safety_score: f64,
}

/// Research category payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchSummary {
    /// Number of relevant papers found
    pub paper_count: u32,
    /// Strength of the supporting evidence
    pub evidence_level: String,
}

/// Category-specific result data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryPayload {
    /// Imaging findings
    Imaging(ImagingFindings),
    /// History assessment
    History(HistoryAssessment),
    /// Drug interaction report
    DrugInteractions(InteractionReport),
    /// Research summary
    Research(ResearchSummary),
}

impl CategoryPayload {
    /// Category this payload belongs to
    pub fn category(&self) -> AnalysisCategory {
        match self {
            CategoryPayload::Imaging(_) => AnalysisCategory::Imaging,
            CategoryPayload::History(_) => AnalysisCategory::History,
            CategoryPayload::DrugInteractions(_) => AnalysisCategory::DrugInteractions,
            CategoryPayload::Research(_) => AnalysisCategory::Research,
        }
    }

    /// Canned, non-live payload for a category.
    ///
    /// Values are zeroed so nobody mistakes them for a clinical result.
    pub fn placeholder(category: AnalysisCategory) -> Self {
        match category {
            AnalysisCategory::Imaging => CategoryPayload::Imaging(ImagingFindings {
                findings: Vec::new(),
                confidence: 0.0,
            }),
            AnalysisCategory::History => CategoryPayload::History(HistoryAssessment {
                risk_factors: Vec::new(),
                confidence: 0.0,
            }),
            AnalysisCategory::DrugInteractions => {
                CategoryPayload::DrugInteractions(InteractionReport {
                    interactions: Vec::new(),
                    safety_score: 0.0,
                })
            }
            AnalysisCategory::Research => CategoryPayload::Research(ResearchSummary {
                paper_count: 0,
                evidence_level: "unavailable".to_string(),
            }),
        }
    }
}

/// Where a category result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    /// Produced by a registered agent
    Live,
    /// No capable agent was available
    Placeholder,
    /// The agent failed or timed out
    Failed,
}

/// One category's slice of an aggregate analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    /// Live, placeholder or failed
    pub source: ResultSource,
    /// Agent that produced (or failed to produce) the result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// Category payload; placeholder data unless `source` is `live`
    pub data: CategoryPayload,
    /// Why the result is not live
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CategoryResult {
    /// Result produced by an agent
    pub fn live(agent: &str, data: CategoryPayload) -> Self {
        Self {
            source: ResultSource::Live,
            agent: Some(agent.to_string()),
            data,
            reason: None,
        }
    }

    /// Placeholder result when no agent could serve the category
    pub fn placeholder(category: AnalysisCategory, reason: impl Into<String>) -> Self {
        Self {
            source: ResultSource::Placeholder,
            agent: None,
            data: CategoryPayload::placeholder(category),
            reason: Some(reason.into()),
        }
    }

    /// Failure marker carrying placeholder data so the shape stays valid
    pub fn failed(category: AnalysisCategory, agent: &str, reason: impl Into<String>) -> Self {
        Self {
            source: ResultSource::Failed,
            agent: Some(agent.to_string()),
            data: CategoryPayload::placeholder(category),
            reason: Some(reason.into()),
        }
    }
}

/// Response of `run_aggregate_analysis`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisEnvelope {
    /// When the analysis was started (ISO-8601, UTC)
    pub timestamp: String,
    /// Unique id of this analysis
    pub analysis_id: String,
    /// Exactly one entry per category
    pub results: BTreeMap<AnalysisCategory, CategoryResult>,
}

/// Source of analysis ids.
///
/// Timestamps handed out never go backwards even if the wall clock does, and
/// the sequence number makes ids unique within one coordinator.
#[derive(Debug, Default)]
pub struct AnalysisClock {
    last: Option<DateTime<Utc>>,
    seq: u64,
}

impl AnalysisClock {
    /// Allocate the timestamp and id for a new analysis
    pub fn next(&mut self, now: DateTime<Utc>, request: &AnalysisRequest) -> (String, String) {
        let at = match self.last {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        self.last = Some(at);
        self.seq += 1;

        let id = format!(
            "analysis_{}_{:06}_{}",
            at.format("%Y%m%dT%H%M%S%.3fZ"),
            self.seq,
            request.short_hash()
        );
        (iso_timestamp(at), id)
    }
}
