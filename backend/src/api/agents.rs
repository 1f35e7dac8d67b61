//! Agent status API handlers
//!
//! Read-only views of the coordinator's status table.

use crate::coordinator::{AgentStatusRecord, StatusSnapshot};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::Json,
};
use std::sync::Arc;

/// GET /api/agents/status - Status of every known agent
pub async fn get_all_status(State(state): State<Arc<AppState>>) -> Json<StatusSnapshot> {
    Json(state.coordinator.get_all_status().await)
}

/// GET /api/agents/:name/status - Status of one agent
///
/// Unknown names are not an HTTP error: the body is a `not_found` record.
pub async fn get_agent_status(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Json<AgentStatusRecord> {
    Json(state.coordinator.get_status(&name).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::coordinator::AgentStatus;

    fn create_test_state() -> Arc<AppState> {
        Arc::new(AppState::from_config(Config::from_env()))
    }

    #[tokio::test]
    async fn test_get_all_status_preseeded() {
        let state = create_test_state();
        let Json(snapshot) = get_all_status(State(state)).await;
        assert_eq!(snapshot.total_agents, 0);
        assert!(snapshot.agents.contains_key("monai"));
        assert!(snapshot.agents.contains_key("research"));
    }

    #[tokio::test]
    async fn test_get_agent_status_not_found() {
        let state = create_test_state();
        let Json(record) = get_agent_status(State(state), Path("xray".to_string())).await;
        assert_eq!(record.status, AgentStatus::NotFound);
        assert_eq!(record.error.as_deref(), Some("Agent xray not found"));
    }
}
