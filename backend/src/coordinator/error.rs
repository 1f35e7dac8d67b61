//! Coordinator-specific error types
//!
//! Errors raised by the coordinator itself and by the agents it drives.

use crate::coordinator::analysis::AnalysisCategory;
use thiserror::Error;

/// Errors returned by coordinator operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    /// Shutdown has begun; only status reads remain valid
    #[error("Coordinator is shut down")]
    ShutDown,

    /// Agent names must be non-empty
    #[error("Invalid agent name: {0:?}")]
    InvalidAgentName(String),
}

/// Errors an agent reports back to the coordinator
///
/// None of these ever escape the coordinator: analysis failures become
/// `failed` category results and teardown failures are logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// The agent has no analysis for this category
    #[error("Agent does not support category {0}")]
    Unsupported(AnalysisCategory),

    /// The analysis ran and failed
    #[error("Analysis failed: {0}")]
    Failed(String),

    /// Releasing the agent's resources failed
    #[error("Teardown failed: {0}")]
    Teardown(String),
}
