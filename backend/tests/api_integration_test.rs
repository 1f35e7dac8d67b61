//! Integration tests for the HTTP handlers
//!
//! Handlers are invoked directly with axum extractors against a state that
//! has the built-in agents registered, the same way `main` wires them.

use axum::extract::{Path, State};
use axum::Json;
use medical_ai_backend::agents::register_builtin;
use medical_ai_backend::api::{agents, analysis, system};
use medical_ai_backend::config::Config;
use medical_ai_backend::coordinator::analysis::Severity;
use medical_ai_backend::coordinator::{
    AgentStatus, AnalysisCategory, AnalysisRequest, CategoryPayload, Lifecycle, ResultSource,
};
use medical_ai_backend::error::AppError;
use medical_ai_backend::state::AppState;
use std::sync::Arc;

/// Helper to create test state with the default built-in agents registered
async fn create_test_state() -> Arc<AppState> {
    let mut config = Config::from_env();
    config.agents.builtin = vec!["history".to_string(), "drug_checker".to_string()];
    config.limits.max_list_items = 10;

    let state = Arc::new(AppState::from_config(config));
    let registered = register_builtin(&state.coordinator, &state.config.agents.builtin).await;
    assert_eq!(registered, 2);
    state
}

#[tokio::test]
async fn test_status_endpoints_show_builtin_agents() {
    let state = create_test_state().await;

    let Json(snapshot) = agents::get_all_status(State(state.clone())).await;
    assert_eq!(snapshot.total_agents, 2);
    assert_eq!(snapshot.agents.len(), 4);

    let Json(record) =
        agents::get_agent_status(State(state.clone()), Path("drug_checker".to_string())).await;
    assert_eq!(record.status, AgentStatus::Ready);
    assert!(record.last_used.is_none());

    let Json(status) = system::system_status(State(state)).await;
    assert_eq!(
        status.registered_agents,
        vec!["drug_checker".to_string(), "history".to_string()]
    );
}

#[tokio::test]
async fn test_analysis_mixes_live_and_placeholder() {
    let state = create_test_state().await;
    let request: AnalysisRequest = serde_json::from_value(serde_json::json!({
        "patient_id": "patient-17",
        "image_id": "chest-xray-3",
        "age": 70,
        "conditions": ["hypertension"],
        "medications": ["Warfarin", "Aspirin"]
    }))
    .unwrap();

    let Json(envelope) = analysis::run_analysis(State(state.clone()), Json(request))
        .await
        .unwrap();

    assert_eq!(envelope.results.len(), 4);

    let drugs = &envelope.results[&AnalysisCategory::DrugInteractions];
    assert_eq!(drugs.source, ResultSource::Live);
    assert_eq!(drugs.agent.as_deref(), Some("drug_checker"));
    match &drugs.data {
        CategoryPayload::DrugInteractions(report) => {
            assert_eq!(report.interactions.len(), 1);
            assert_eq!(report.interactions[0].severity, Severity::Major);
            assert!(report.safety_score < 1.0);
        }
        other => panic!("Expected drug interaction payload, got: {:?}", other),
    }

    let history = &envelope.results[&AnalysisCategory::History];
    assert_eq!(history.source, ResultSource::Live);
    match &history.data {
        CategoryPayload::History(assessment) => {
            assert!(assessment
                .risk_factors
                .contains(&"advanced age".to_string()));
            assert!(assessment
                .risk_factors
                .contains(&"hypertension".to_string()));
        }
        other => panic!("Expected history payload, got: {:?}", other),
    }

    for category in [AnalysisCategory::Imaging, AnalysisCategory::Research] {
        assert_eq!(envelope.results[&category].source, ResultSource::Placeholder);
    }

    let record = state.coordinator.get_status("history").await;
    assert_eq!(record.status, AgentStatus::Ready);
    assert!(record.last_used.is_some());
}

#[tokio::test]
async fn test_analysis_rejects_oversized_lists() {
    let state = create_test_state().await;
    let request = AnalysisRequest {
        conditions: (0..11).map(|i| format!("condition {}", i)).collect(),
        ..Default::default()
    };

    let result = analysis::run_analysis(State(state), Json(request)).await;
    match result {
        Err(AppError::PayloadTooLarge(msg)) => assert!(msg.contains("conditions")),
        Err(other) => panic!("Expected PayloadTooLarge, got: {:?}", other),
        Ok(_) => panic!("Expected oversized request to be rejected"),
    }
}

#[tokio::test]
async fn test_shutdown_flow() {
    let state = create_test_state().await;
    state.coordinator.shutdown().await;

    let Json(health) = system::health_check(State(state.clone())).await;
    assert_eq!(health.status, "draining");

    let Json(status) = system::system_status(State(state.clone())).await;
    assert_eq!(status.lifecycle, Lifecycle::Terminated);
    assert!(status.registered_agents.is_empty());

    let result = analysis::run_analysis(State(state), Json(AnalysisRequest::default())).await;
    assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
}

#[tokio::test]
async fn test_analysis_rejects_blank_medication() {
    let state = create_test_state().await;
    let request = AnalysisRequest {
        medications: vec!["Warfarin".to_string(), String::new()],
        ..Default::default()
    };

    let result = analysis::run_analysis(State(state.clone()), Json(request)).await;
    match result {
        Err(AppError::InvalidRequest(msg)) => assert!(msg.contains("medications[1]")),
        Err(other) => panic!("Expected InvalidRequest, got: {:?}", other),
        Ok(_) => panic!("Expected blank medication to be rejected"),
    }

    // Rejected before any agent was claimed
    let record = state.coordinator.get_status("drug_checker").await;
    assert_eq!(record.status, AgentStatus::Ready);
    assert!(record.last_used.is_none());
}
