//! Status registry types
//!
//! Status records for individual agents, the snapshot returned by
//! `get_all_status`, and the coordinator lifecycle.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Names pre-seeded in the status table before any agent registers
pub const WELL_KNOWN_AGENTS: [&str; 4] = ["monai", "history", "drug_checker", "research"];

/// Agent status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// Idle and able to take an analysis
    Ready,
    /// Currently running an analysis
    Busy,
    /// Last call or teardown failed
    Error,
    /// No status entry exists for the name
    NotFound,
}

/// Per-agent status entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatusRecord {
    /// Current status
    pub status: AgentStatus,
    /// When the agent last finished a call, `None` until first use
    pub last_used: Option<DateTime<Utc>>,
    /// Failure or lookup message, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentStatusRecord {
    /// Fresh record for a newly registered (or pre-seeded) agent
    pub fn ready() -> Self {
        Self {
            status: AgentStatus::Ready,
            last_used: None,
            error: None,
        }
    }

    /// Sentinel record returned for unknown names
    pub fn not_found(name: &str) -> Self {
        Self {
            status: AgentStatus::NotFound,
            last_used: None,
            error: Some(format!("Agent {} not found", name)),
        }
    }

    /// Whether the coordinator may hand this agent a new analysis.
    ///
    /// An `error` status only records the outcome of the previous call, so
    /// it does not lock the agent out.
    pub fn is_available(&self) -> bool {
        matches!(self.status, AgentStatus::Ready | AgentStatus::Error)
    }
}

/// Point-in-time view of the whole status table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Every status entry, including never-registered well-known names
    pub agents: BTreeMap<String, AgentStatusRecord>,
    /// Snapshot creation time (ISO-8601, UTC)
    pub timestamp: String,
    /// Number of registered agent handles
    pub total_agents: usize,
}

/// Coordinator lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Accepting registrations and analyses
    Operational,
    /// Agents are being torn down
    ShuttingDown,
    /// All teardowns have been attempted
    Terminated,
}

/// Format a timestamp the way every API payload carries it
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
