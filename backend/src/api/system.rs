//! System API handlers
//!
//! Hello, health check and process status endpoints.

use crate::coordinator::Lifecycle;
use crate::state::AppState;
use axum::{extract::State, response::Json};
use serde::Serialize;
use std::sync::Arc;

/// Hello response
#[derive(Debug, Serialize)]
pub struct HelloResponse {
    /// Greeting
    pub message: String,
    /// Always "ok"
    pub status: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" while the coordinator is operational, else "draining"
    pub status: String,
    /// Crate version
    pub version: String,
    /// Human-readable detail
    pub message: String,
}

/// Process status response
#[derive(Debug, Serialize)]
pub struct SystemStatusResponse {
    /// Crate version
    pub version: String,
    /// Seconds since startup
    pub uptime_secs: u64,
    /// Coordinator lifecycle phase
    pub lifecycle: Lifecycle,
    /// Registered agent names
    pub registered_agents: Vec<String>,
    /// Entries in the status table (includes never-registered well-known names)
    pub status_entries: usize,
}

/// GET / - Hello
pub async fn hello_world() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello from the Medical AI Platform backend!".to_string(),
        status: "ok".to_string(),
    })
}

/// GET /api/health - Health check
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (status, message) = match state.coordinator.lifecycle().await {
        Lifecycle::Operational => ("healthy", "Backend is healthy"),
        _ => ("draining", "Backend is shutting down"),
    };
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: message.to_string(),
    })
}

/// GET /api/system/status - Process and coordinator status
pub async fn system_status(State(state): State<Arc<AppState>>) -> Json<SystemStatusResponse> {
    let snapshot = state.coordinator.get_all_status().await;
    Json(SystemStatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
        lifecycle: state.coordinator.lifecycle().await,
        registered_agents: state.coordinator.registered_agents().await,
        status_entries: snapshot.agents.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_health_reflects_lifecycle() {
        let state = Arc::new(AppState::from_config(Config::from_env()));

        let Json(health) = health_check(State(state.clone())).await;
        assert_eq!(health.status, "healthy");

        state.coordinator.shutdown().await;
        let Json(health) = health_check(State(state)).await;
        assert_eq!(health.status, "draining");
    }

    #[tokio::test]
    async fn test_system_status_counts() {
        let state = Arc::new(AppState::from_config(Config::from_env()));
        let Json(status) = system_status(State(state)).await;
        assert_eq!(status.lifecycle, Lifecycle::Operational);
        assert!(status.registered_agents.is_empty());
        assert_eq!(status.status_entries, 4);
    }
}
