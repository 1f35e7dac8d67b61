//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use crate::agents::BUILTIN_AGENTS;
use crate::coordinator::CoordinatorConfig;
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Agent coordinator timeouts
    pub coordinator: CoordinatorConfig,
    /// Agent registration settings
    pub agents: AgentsConfig,
    /// Request limits
    pub limits: LimitsConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Agent registration settings
#[derive(Debug, Clone)]
pub struct AgentsConfig {
    /// Built-in agents to register at startup
    pub builtin: Vec<String>,
}

/// Request limits
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Maximum number of medications or conditions in one analysis request
    pub max_list_items: usize,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let defaults = CoordinatorConfig::default();
        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8000),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            coordinator: CoordinatorConfig {
                category_timeout_ms: parse_positive("CATEGORY_TIMEOUT_MS")
                    .unwrap_or(defaults.category_timeout_ms),
                teardown_timeout_ms: parse_positive("TEARDOWN_TIMEOUT_MS")
                    .unwrap_or(defaults.teardown_timeout_ms),
            },
            agents: AgentsConfig {
                builtin: env::var("BUILTIN_AGENTS")
                    .map(|list| parse_list(&list))
                    .unwrap_or_else(|_| BUILTIN_AGENTS.iter().map(|s| s.to_string()).collect()),
            },
            limits: LimitsConfig {
                max_list_items: env::var("MAX_LIST_ITEMS")
                    .ok()
                    .and_then(|n| n.parse().ok())
                    .filter(|n| *n > 0)
                    .unwrap_or(200),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// Zero is ignored so a typo cannot disable every timeout
fn parse_positive(key: &str) -> Option<u64> {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|v| *v > 0)
}

/// Split a comma-separated list, dropping blanks
fn parse_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
