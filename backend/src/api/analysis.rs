//! Aggregate analysis API handler
//!
//! Validates the request lists, then hands the request to the coordinator,
//! which fans it out to the imaging, history, drug interaction and research
//! agents.

use crate::coordinator::{AnalysisEnvelope, AnalysisRequest};
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, response::Json};
use std::sync::Arc;

/// Reject requests whose lists exceed `max_items` or hold blank entries
///
/// # Returns
/// * `Ok(())` - Request is within limits
/// * `Err(AppError::PayloadTooLarge)` - A list is too long
/// * `Err(AppError::InvalidRequest)` - A list entry is blank
pub fn validate_request(request: &AnalysisRequest, max_items: usize) -> Result<(), AppError> {
    for (field, entries) in [
        ("medications", &request.medications),
        ("conditions", &request.conditions),
    ] {
        if entries.len() > max_items {
            return Err(AppError::PayloadTooLarge(format!(
                "{} has {} entries, maximum is {}",
                field,
                entries.len(),
                max_items
            )));
        }
        if let Some(index) = entries.iter().position(|entry| entry.trim().is_empty()) {
            return Err(AppError::InvalidRequest(format!(
                "{}[{}] is blank",
                field, index
            )));
        }
    }
    Ok(())
}

/// POST /api/analysis - Run an aggregate analysis
pub async fn run_analysis(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisEnvelope>, AppError> {
    validate_request(&request, state.config.limits.max_list_items)?;

    tracing::debug!(
        patient_id = ?request.patient_id,
        image_id = ?request.image_id,
        medications = request.medications.len(),
        "Starting aggregate analysis"
    );

    let envelope = state.coordinator.run_aggregate_analysis(&request).await?;
    Ok(Json(envelope))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::coordinator::{AnalysisCategory, ResultSource};

    fn create_test_state() -> Arc<AppState> {
        Arc::new(AppState::from_config(Config::from_env()))
    }

    #[test]
    fn test_validate_request_limits() {
        let request = AnalysisRequest {
            medications: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            ..Default::default()
        };
        assert!(validate_request(&request, 3).is_ok());
        match validate_request(&request, 2) {
            Err(AppError::PayloadTooLarge(msg)) => assert!(msg.contains("medications")),
            other => panic!("Expected PayloadTooLarge, got: {:?}", other),
        }
    }

    #[test]
    fn test_validate_request_rejects_blank_entries() {
        let request = AnalysisRequest {
            medications: vec!["Warfarin".to_string()],
            conditions: vec!["diabetes".to_string(), "  ".to_string()],
            ..Default::default()
        };
        match validate_request(&request, 10) {
            Err(AppError::InvalidRequest(msg)) => assert_eq!(msg, "conditions[1] is blank"),
            other => panic!("Expected InvalidRequest, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_analysis_without_agents() {
        let state = create_test_state();
        let Json(envelope) = run_analysis(State(state), Json(AnalysisRequest::default()))
            .await
            .unwrap();
        assert_eq!(envelope.results.len(), 4);
        assert!(envelope
            .results
            .values()
            .all(|result| result.source == ResultSource::Placeholder));
        assert!(envelope.results.contains_key(&AnalysisCategory::Imaging));
    }

    #[tokio::test]
    async fn test_run_analysis_after_shutdown() {
        let state = create_test_state();
        state.coordinator.shutdown().await;
        let result = run_analysis(State(state), Json(AnalysisRequest::default())).await;
        assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
    }
}
