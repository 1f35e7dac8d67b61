//! Built-in agents
//!
//! Deterministic, table-driven agents shipped with the service. `monai` and
//! `research` need external models and have no built-in implementation.

pub mod drug_checker;
pub mod history;

pub use drug_checker::DrugInteractionAgent;
pub use history::HistoryAgent;

use crate::coordinator::{AgentCoordinator, AgentHandle};
use std::sync::Arc;
use tracing::warn;

/// Names that have a built-in agent
pub const BUILTIN_AGENTS: [&str; 2] = ["history", "drug_checker"];

/// Construct the built-in agent registered under `name`, if there is one
pub fn builtin(name: &str) -> Option<AgentHandle> {
    match name {
        "history" => Some(Arc::new(HistoryAgent::new())),
        "drug_checker" => Some(Arc::new(DrugInteractionAgent::new())),
        _ => None,
    }
}

/// Register the requested built-in agents with `coordinator`.
///
/// Unknown names are logged and skipped.
///
/// # Returns
/// * `usize` - Number of agents registered
pub async fn register_builtin(coordinator: &AgentCoordinator, names: &[String]) -> usize {
    let mut registered = 0;
    for name in names {
        let Some(handle) = builtin(name) else {
            warn!(agent = %name, "No built-in agent with this name, skipping");
            continue;
        };
        match coordinator.register(name.clone(), handle).await {
            Ok(()) => registered += 1,
            Err(e) => warn!(agent = %name, error = %e, "Failed to register built-in agent"),
        }
    }
    registered
}
