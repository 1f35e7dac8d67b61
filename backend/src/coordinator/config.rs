//! Coordinator configuration
//!
//! Timeouts applied to agent calls made by the coordinator.

use std::time::Duration;

/// Coordinator configuration
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Per-category analysis timeout in milliseconds
    pub category_timeout_ms: u64,
    /// Per-agent teardown timeout in milliseconds
    pub teardown_timeout_ms: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            category_timeout_ms: 30_000, // 30 seconds
            teardown_timeout_ms: 5_000,
        }
    }
}

impl CoordinatorConfig {
    /// Timeout for a single category call
    pub fn category_timeout(&self) -> Duration {
        Duration::from_millis(self.category_timeout_ms)
    }

    /// Timeout for a single agent teardown
    pub fn teardown_timeout(&self) -> Duration {
        Duration::from_millis(self.teardown_timeout_ms)
    }
}
