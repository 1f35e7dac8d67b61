//! Agent coordinator
//!
//! Central registry through which named AI-capability agents are registered,
//! queried, invoked in aggregate and shut down.
//!
//! All mutable state sits behind a single `RwLock`. Writers hold it only for
//! the map mutation itself; agent calls and teardowns always run without it,
//! so a slow agent never blocks registrations or status reads.

pub mod analysis;
pub mod capability;
pub mod config;
pub mod error;
pub mod types;

pub use analysis::{
    AnalysisCategory, AnalysisEnvelope, AnalysisRequest, CategoryPayload, CategoryResult,
    ResultSource,
};
pub use capability::AgentCapability;
pub use config::CoordinatorConfig;
pub use error::{AgentError, CoordinatorError};
pub use types::{AgentStatus, AgentStatusRecord, Lifecycle, StatusSnapshot, WELL_KNOWN_AGENTS};

use analysis::AnalysisClock;
use chrono::Utc;
use futures_util::future::join_all;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, info, info_span, warn, Instrument};
use types::iso_timestamp;

/// Shared handle to a registered agent
pub type AgentHandle = Arc<dyn AgentCapability>;

/// Error recorded for an agent drained by shutdown while serving an analysis
pub const SHUT_DOWN_DURING_ANALYSIS: &str = "shut down during analysis";

/// A registered agent and the calls currently running on it
struct Registration {
    handle: AgentHandle,
    /// Category calls claimed and not yet released
    in_flight: usize,
    /// Most recent failure among those calls, reported once they all end
    failure: Option<String>,
}

impl Registration {
    fn new(handle: AgentHandle) -> Self {
        Self {
            handle,
            in_flight: 0,
            failure: None,
        }
    }
}

/// Mutable coordinator state, guarded as a whole
struct CoordinatorState {
    /// Registered agents (name -> registration)
    agents: HashMap<String, Registration>,
    /// Status table, a superset of `agents`' keys
    status: HashMap<String, AgentStatusRecord>,
    lifecycle: Lifecycle,
    clock: AnalysisClock,
}

impl CoordinatorState {
    fn new() -> Self {
        let status = WELL_KNOWN_AGENTS
            .iter()
            .map(|name| (name.to_string(), AgentStatusRecord::ready()))
            .collect();

        Self {
            agents: HashMap::new(),
            status,
            lifecycle: Lifecycle::Operational,
            clock: AnalysisClock::default(),
        }
    }

    /// Candidate agents for a category: the designated well-known agent first,
    /// then every other capable agent ordered by name.
    fn candidates(&self, category: AnalysisCategory) -> Vec<(&String, &AgentHandle)> {
        let designated = category.designated_agent();
        let mut candidates: Vec<_> = self
            .agents
            .iter()
            .map(|(name, registration)| (name, &registration.handle))
            .filter(|(_, handle)| handle.supports(category))
            .collect();
        candidates.sort_by(|(a, _), (b, _)| {
            (a.as_str() != designated)
                .cmp(&(b.as_str() != designated))
                .then_with(|| a.cmp(b))
        });
        candidates
    }

    /// Pick an agent for `category` and mark it busy.
    ///
    /// `claimed` holds the agents this analysis already took; they stay
    /// eligible for its remaining categories even though they now read busy.
    fn claim(&mut self, category: AnalysisCategory, claimed: &mut HashSet<String>) -> Claim {
        let candidates = self.candidates(category);
        if candidates.is_empty() {
            return Claim::Unavailable(format!("no registered agent supports {}", category));
        }

        let picked = candidates.iter().find(|(name, _)| {
            claimed.contains(name.as_str())
                || self
                    .status
                    .get(name.as_str())
                    .map(AgentStatusRecord::is_available)
                    .unwrap_or(false)
        });

        let Some((name, handle)) = picked else {
            let names: Vec<&str> = candidates.iter().map(|(name, _)| name.as_str()).collect();
            return Claim::Unavailable(format!("capable agents are busy: {}", names.join(", ")));
        };
        let (name, handle) = (name.to_string(), Arc::clone(*handle));

        if let Some(registration) = self.agents.get_mut(&name) {
            registration.in_flight += 1;
        }
        if let Some(record) = self.status.get_mut(&name) {
            record.status = AgentStatus::Busy;
        }
        claimed.insert(name.clone());
        Claim::Agent(name, handle)
    }

    /// Release one claim on `name`, recording the call outcome.
    ///
    /// The agent leaves `busy` only when its last in-flight call ends. A
    /// handle that was replaced or drained by shutdown changes nothing.
    fn release(&mut self, name: &str, handle: &AgentHandle, failure: Option<String>) {
        let Some(registration) = self
            .agents
            .get_mut(name)
            .filter(|registration| same_handle(&registration.handle, handle))
        else {
            return;
        };

        registration.in_flight = registration.in_flight.saturating_sub(1);
        if failure.is_some() {
            registration.failure = failure;
        }
        let settled = if registration.in_flight == 0 {
            Some(registration.failure.take())
        } else {
            None
        };

        if let Some(record) = self.status.get_mut(name) {
            record.last_used = Some(Utc::now());
            match settled {
                None => {}
                Some(None) => {
                    record.status = AgentStatus::Ready;
                    record.error = None;
                }
                Some(Some(message)) => {
                    record.status = AgentStatus::Error;
                    record.error = Some(message);
                }
            }
        }
    }
}

/// Outcome of trying to reserve an agent for one category
enum Claim {
    Agent(String, AgentHandle),
    Unavailable(String),
}

fn same_handle(a: &AgentHandle, b: &AgentHandle) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// One analysis' category calls, run as a detached task.
///
/// Owning the state handle lets every claim be released even when the
/// caller stops waiting for the envelope.
struct FanOut {
    state: Arc<RwLock<CoordinatorState>>,
    config: CoordinatorConfig,
    request: Arc<AnalysisRequest>,
}

impl FanOut {
    async fn run(
        self,
        claims: Vec<(AnalysisCategory, Claim)>,
    ) -> BTreeMap<AnalysisCategory, CategoryResult> {
        let outcomes = join_all(
            claims
                .into_iter()
                .map(|(category, claim)| self.run_category(category, claim)),
        )
        .await;

        let results: BTreeMap<AnalysisCategory, CategoryResult> = outcomes.into_iter().collect();
        let live = results
            .values()
            .filter(|result| result.source == ResultSource::Live)
            .count();
        info!(live = live, total = results.len(), "Aggregate analysis completed");
        results
    }

    /// Run one category on its claimed agent, isolated in its own task
    async fn run_category(
        &self,
        category: AnalysisCategory,
        claim: Claim,
    ) -> (AnalysisCategory, CategoryResult) {
        let (name, handle) = match claim {
            Claim::Agent(name, handle) => (name, handle),
            Claim::Unavailable(reason) => {
                debug!(category = %category, reason = %reason, "Using placeholder result");
                return (category, CategoryResult::placeholder(category, reason));
            }
        };

        let task = {
            let handle = Arc::clone(&handle);
            let request = Arc::clone(&self.request);
            tokio::spawn(async move { handle.analyze(category, &request).await })
        };
        let abort = task.abort_handle();

        let outcome = match timeout(self.config.category_timeout(), task).await {
            Ok(Ok(Ok(payload))) if payload.category() == category => Ok(payload),
            Ok(Ok(Ok(payload))) => Err(format!(
                "agent returned a {} payload for {}",
                payload.category(),
                category
            )),
            Ok(Ok(Err(e))) => Err(e.to_string()),
            Ok(Err(join_error)) => Err(format!("agent task aborted: {}", join_error)),
            Err(_) => {
                abort.abort();
                Err(format!(
                    "timed out after {} ms",
                    self.config.category_timeout_ms
                ))
            }
        };

        self.state
            .write()
            .await
            .release(&name, &handle, outcome.as_ref().err().cloned());

        match outcome {
            Ok(payload) => {
                debug!(category = %category, agent = %name, "Live result");
                (category, CategoryResult::live(&name, payload))
            }
            Err(reason) => {
                warn!(category = %category, agent = %name, error = %reason, "Category analysis failed");
                (category, CategoryResult::failed(category, &name, reason))
            }
        }
    }
}

/// Registry, status table and analysis orchestrator for medical AI agents.
///
/// One instance per process, created by the composition root and shared by
/// `Arc` with every request handler.
pub struct AgentCoordinator {
    config: CoordinatorConfig,
    state: Arc<RwLock<CoordinatorState>>,
}

impl Default for AgentCoordinator {
    fn default() -> Self {
        Self::new(CoordinatorConfig::default())
    }
}

impl AgentCoordinator {
    /// Create an operational coordinator with the well-known names pre-seeded
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(CoordinatorState::new())),
        }
    }

    /// Configuration in effect
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Current lifecycle phase
    pub async fn lifecycle(&self) -> Lifecycle {
        self.state.read().await.lifecycle
    }

    /// Register `handle` under `name`.
    ///
    /// Re-registering a name replaces the previous handle (which is not torn
    /// down) and resets its status to `ready`.
    ///
    /// # Returns
    /// * `Err(CoordinatorError::InvalidAgentName)` - `name` is blank
    /// * `Err(CoordinatorError::ShutDown)` - shutdown has begun
    pub async fn register(
        &self,
        name: impl Into<String>,
        handle: AgentHandle,
    ) -> Result<(), CoordinatorError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoordinatorError::InvalidAgentName(name));
        }

        let replaced = {
            let mut state = self.state.write().await;
            if state.lifecycle != Lifecycle::Operational {
                return Err(CoordinatorError::ShutDown);
            }
            let replaced = state
                .agents
                .insert(name.clone(), Registration::new(handle))
                .is_some();
            state.status.insert(name.clone(), AgentStatusRecord::ready());
            replaced
        };

        info!(agent = %name, replaced = replaced, "Registered agent");
        Ok(())
    }

    /// Status record for `name`, or a `not_found` record
    pub async fn get_status(&self, name: &str) -> AgentStatusRecord {
        let state = self.state.read().await;
        state
            .status
            .get(name)
            .cloned()
            .unwrap_or_else(|| AgentStatusRecord::not_found(name))
    }

    /// Coherent snapshot of the whole status table
    pub async fn get_all_status(&self) -> StatusSnapshot {
        let state = self.state.read().await;
        StatusSnapshot {
            agents: state
                .status
                .iter()
                .map(|(name, record)| (name.clone(), record.clone()))
                .collect(),
            timestamp: iso_timestamp(Utc::now()),
            total_agents: state.agents.len(),
        }
    }

    /// Names of the registered agents, sorted
    pub async fn registered_agents(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut names: Vec<String> = state.agents.keys().cloned().collect();
        names.sort();
        names
    }

    /// Fan an analysis out to every category and collect the results.
    ///
    /// Categories without an available agent degrade to placeholders; a
    /// failing or slow agent degrades only its own category. The envelope
    /// always holds exactly one result per category. The calls run in a
    /// spawned task, so dropping this future does not leave agents busy.
    ///
    /// # Returns
    /// * `Err(CoordinatorError::ShutDown)` - shutdown has begun
    pub async fn run_aggregate_analysis(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisEnvelope, CoordinatorError> {
        let (timestamp, analysis_id, claims) = {
            let mut state = self.state.write().await;
            if state.lifecycle != Lifecycle::Operational {
                return Err(CoordinatorError::ShutDown);
            }
            let (timestamp, analysis_id) = state.clock.next(Utc::now(), request);
            let mut claimed = HashSet::new();
            let claims: Vec<(AnalysisCategory, Claim)> = AnalysisCategory::ALL
                .iter()
                .map(|category| (*category, state.claim(*category, &mut claimed)))
                .collect();
            (timestamp, analysis_id, claims)
        };

        let fan_out = FanOut {
            state: Arc::clone(&self.state),
            config: self.config.clone(),
            request: Arc::new(request.clone()),
        };
        let span = info_span!("aggregate_analysis", analysis_id = %analysis_id);
        let task = tokio::spawn(fan_out.run(claims).instrument(span));

        let results = match task.await {
            Ok(results) => results,
            Err(join_error) => {
                warn!(analysis_id = %analysis_id, error = %join_error, "Aggregate analysis task aborted");
                AnalysisCategory::ALL
                    .iter()
                    .map(|category| {
                        let reason = format!("analysis task aborted: {}", join_error);
                        (*category, CategoryResult::placeholder(*category, reason))
                    })
                    .collect()
            }
        };

        Ok(AnalysisEnvelope {
            timestamp,
            analysis_id,
            results,
        })
    }

    /// Tear down every registered agent.
    ///
    /// Agents still serving an analysis are marked `error`, since their
    /// completion can no longer be recorded. Each teardown runs in its own
    /// task under the teardown timeout; a failure is logged and recorded on
    /// the agent's status, and the remaining agents are still torn down.
    /// Calling this again after the first call is a no-op.
    pub async fn shutdown(&self) {
        let drained = {
            let mut state = self.state.write().await;
            if state.lifecycle != Lifecycle::Operational {
                debug!(lifecycle = ?state.lifecycle, "Shutdown already performed");
                return;
            }
            state.lifecycle = Lifecycle::ShuttingDown;
            let mut drained: Vec<(String, Registration)> = state.agents.drain().collect();
            drained.sort_by(|(a, _), (b, _)| a.cmp(b));

            for (name, registration) in &drained {
                if registration.in_flight == 0 {
                    continue;
                }
                if let Some(record) = state.status.get_mut(name) {
                    record.status = AgentStatus::Error;
                    record.error = Some(SHUT_DOWN_DURING_ANALYSIS.to_string());
                }
            }
            drained
        };

        info!(agents = drained.len(), "Shutting down agent coordinator");

        for (name, Registration { handle, .. }) in drained {
            let task = tokio::spawn(async move { handle.teardown().await });
            let abort = task.abort_handle();

            let failure = match timeout(self.config.teardown_timeout(), task).await {
                Ok(Ok(Ok(()))) => None,
                Ok(Ok(Err(e))) => Some(e.to_string()),
                Ok(Err(join_error)) => Some(format!("teardown task aborted: {}", join_error)),
                Err(_) => {
                    abort.abort();
                    Some(format!(
                        "teardown timed out after {} ms",
                        self.config.teardown_timeout_ms
                    ))
                }
            };

            match failure {
                None => debug!(agent = %name, "Agent torn down"),
                Some(message) => {
                    warn!(agent = %name, error = %message, "Agent teardown failed");
                    let mut state = self.state.write().await;
                    if let Some(record) = state.status.get_mut(&name) {
                        record.status = AgentStatus::Error;
                        record.error = Some(message);
                    }
                }
            }
        }

        self.state.write().await.lifecycle = Lifecycle::Terminated;
        info!("Agent coordinator terminated");
    }
}
