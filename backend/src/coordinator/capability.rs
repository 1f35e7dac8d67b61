//! Agent capability contract
//!
//! The trait every registered agent handle implements. All methods have
//! defaults, so an agent only overrides what it actually provides.

use crate::coordinator::analysis::{AnalysisCategory, AnalysisRequest, CategoryPayload};
use crate::coordinator::error::AgentError;
use async_trait::async_trait;

/// A named AI capability the coordinator can drive
#[async_trait]
pub trait AgentCapability: Send + Sync {
    /// Whether the agent can produce results for `category`
    fn supports(&self, _category: AnalysisCategory) -> bool {
        false
    }

    /// Run the analysis for one category.
    ///
    /// The returned payload must belong to `category`; anything else is
    /// treated as a failure by the coordinator.
    async fn analyze(
        &self,
        category: AnalysisCategory,
        _request: &AnalysisRequest,
    ) -> Result<CategoryPayload, AgentError> {
        Err(AgentError::Unsupported(category))
    }

    /// Release the agent's resources. Called once, during coordinator shutdown.
    async fn teardown(&self) -> Result<(), AgentError> {
        Ok(())
    }
}
