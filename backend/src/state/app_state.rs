// Application state shared by every request handler
// Owns the agent coordinator for the lifetime of the process

use crate::config::Config;
use crate::coordinator::AgentCoordinator;
use std::sync::Arc;
use std::time::Instant;

/// Main application state
///
/// Built once by the composition root and handed to axum as
/// `State<Arc<AppState>>`. The coordinator guards its own state, so no outer
/// lock is needed here.
#[derive(Clone)]
pub struct AppState {
    /// Agent registry and analysis orchestrator
    pub coordinator: Arc<AgentCoordinator>,
    /// Configuration the process was started with
    pub config: Config,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Create application state around a coordinator
    pub fn new(config: Config, coordinator: Arc<AgentCoordinator>) -> Self {
        Self {
            coordinator,
            config,
            started_at: Instant::now(),
        }
    }

    /// Build state with a fresh coordinator configured from `config`
    pub fn from_config(config: Config) -> Self {
        let coordinator = Arc::new(AgentCoordinator::new(config.coordinator.clone()));
        Self::new(config, coordinator)
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::Lifecycle;

    #[tokio::test]
    async fn test_from_config_uses_coordinator_settings() {
        let mut config = Config::from_env();
        config.coordinator.category_timeout_ms = 1234;

        let state = AppState::from_config(config);
        assert_eq!(state.coordinator.config().category_timeout_ms, 1234);
        assert_eq!(state.coordinator.lifecycle().await, Lifecycle::Operational);
        assert_eq!(state.uptime_secs(), 0);
    }
}
