//! API module
//!
//! Contains HTTP request handlers and the route table

pub mod agents;
pub mod analysis;
pub mod system;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the route table (without middleware)
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check and hello world
        .route("/", get(system::hello_world))
        .route("/api/health", get(system::health_check))
        .route("/api/system/status", get(system::system_status))
        // Agent status API
        .route("/api/agents/status", get(agents::get_all_status))
        .route("/api/agents/:name/status", get(agents::get_agent_status))
        // Aggregate analysis
        .route("/api/analysis", post(analysis::run_analysis))
        .with_state(state)
}
