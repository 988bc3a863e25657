//! Upstream Health Tracker
//!
//! Decides, per capability, which of two interchangeable backends is
//! authoritative. Candidates are probed with a synthetic battery on a fixed
//! interval; the primary has to fail `failure_threshold` consecutive cycles
//! before the secondary is even tried.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::probe::{Capability, ProbeReport};
use super::transport::ProbeTransport;

// == Endpoint ==
/// A named backend base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub id: String,
    pub base_url: String,
}

impl Endpoint {
    pub fn new(id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointSlot {
    Primary,
    Secondary,
}

/// The two candidates serving one capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePair {
    pub primary: Endpoint,
    pub secondary: Endpoint,
}

impl CandidatePair {
    pub fn new(primary: Endpoint, secondary: Endpoint) -> Self {
        Self { primary, secondary }
    }

    pub fn get(&self, slot: EndpointSlot) -> &Endpoint {
        match slot {
            EndpointSlot::Primary => &self.primary,
            EndpointSlot::Secondary => &self.secondary,
        }
    }
}

// == Capability State ==
/// Mutable health state of one capability.
///
/// `active` only ever moves to a candidate that just passed its probe; when
/// every candidate fails it stays where it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamCapabilityState {
    pub active: EndpointSlot,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub primary_failures: u32,
    pub secondary_failures: u32,
}

impl Default for UpstreamCapabilityState {
    fn default() -> Self {
        Self {
            active: EndpointSlot::Primary,
            last_checked_at: None,
            primary_failures: 0,
            secondary_failures: 0,
        }
    }
}

/// Serializable view of one capability for operators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilitySnapshot {
    pub capability: Capability,
    pub provider: String,
    pub base_url: String,
    pub active_slot: EndpointSlot,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub consecutive_failures: BTreeMap<String, u32>,
}

/// What one capability check concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Primary passed and is pinned
    PrimaryHealthy,
    /// Primary failed but has not reached the switching threshold yet
    PrimaryFailing { failures: u32 },
    /// Primary failed past the threshold and the secondary passed
    SwitchedToSecondary,
    /// Both failed; the previous choice stays pinned
    AllFailed,
}

// == Tracker Settings ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSettings {
    /// Consecutive primary failures before the secondary is tried
    pub failure_threshold: u32,
    /// Limit for a single synthetic query
    pub probe_timeout: Duration,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 1,
            probe_timeout: Duration::from_secs(5),
        }
    }
}

struct CapabilityEntry {
    candidates: CandidatePair,
    /// Held for a whole check so overlapping cycles commit in order
    cycle: Mutex<()>,
    state: RwLock<UpstreamCapabilityState>,
}

impl CapabilityEntry {
    fn new(candidates: CandidatePair) -> Self {
        Self {
            candidates,
            cycle: Mutex::new(()),
            state: RwLock::new(UpstreamCapabilityState::default()),
        }
    }
}

// == Upstream Health Tracker ==
/// Per-capability endpoint selection with hysteresis.
///
/// Each capability's state has its own lock; it is never held across a
/// network call, so readers are never blocked by a slow probe and a
/// cancelled cycle leaves the last committed state in place. Whole checks
/// of one capability are serialized by a separate cycle guard.
pub struct UpstreamHealthTracker {
    stations: CapabilityEntry,
    journeys: CapabilityEntry,
    transport: Arc<dyn ProbeTransport>,
    settings: TrackerSettings,
}

impl UpstreamHealthTracker {
    /// Creates a tracker pinned to each capability's primary.
    pub fn new(
        transport: Arc<dyn ProbeTransport>,
        settings: TrackerSettings,
        stations: CandidatePair,
        journeys: CandidatePair,
    ) -> Self {
        Self {
            stations: CapabilityEntry::new(stations),
            journeys: CapabilityEntry::new(journeys),
            transport,
            settings,
        }
    }

    fn entry(&self, capability: Capability) -> &CapabilityEntry {
        match capability {
            Capability::Stations => &self.stations,
            Capability::Journeys => &self.journeys,
        }
    }

    pub fn settings(&self) -> TrackerSettings {
        self.settings
    }

    // == State Reads ==
    /// Base URL request handlers should use right now. Defined from
    /// construction on.
    pub async fn get_active_base_url(&self, capability: Capability) -> String {
        self.get_active_endpoint(capability).await.base_url
    }

    pub async fn get_active_endpoint(&self, capability: Capability) -> Endpoint {
        let entry = self.entry(capability);
        let active = entry.state.read().await.active;
        entry.candidates.get(active).clone()
    }

    pub async fn state(&self, capability: Capability) -> UpstreamCapabilityState {
        self.entry(capability).state.read().await.clone()
    }

    pub async fn snapshot(&self) -> Vec<CapabilitySnapshot> {
        let mut out = Vec::with_capacity(Capability::ALL.len());
        for capability in Capability::ALL {
            let entry = self.entry(capability);
            let state = entry.state.read().await.clone();
            let active = entry.candidates.get(state.active);

            let mut failures = BTreeMap::new();
            failures.insert(entry.candidates.primary.id.clone(), state.primary_failures);
            failures.insert(entry.candidates.secondary.id.clone(), state.secondary_failures);

            out.push(CapabilitySnapshot {
                capability,
                provider: active.id.clone(),
                base_url: active.base_url.clone(),
                active_slot: state.active,
                last_checked_at: state.last_checked_at,
                consecutive_failures: failures,
            });
        }
        out
    }

    /// Oldest completed check across capabilities, `None` until every
    /// capability has been checked once.
    pub async fn last_full_check(&self) -> Option<DateTime<Utc>> {
        let mut oldest: Option<DateTime<Utc>> = None;
        for capability in Capability::ALL {
            let checked = self.entry(capability).state.read().await.last_checked_at?;
            oldest = Some(oldest.map_or(checked, |o| o.min(checked)));
        }
        oldest
    }

    // == Probe Cycle ==
    /// Checks every capability once. Never fails: probe errors only count
    /// against the endpoint that produced them.
    pub async fn run_probe_cycle(&self) {
        info!("Running upstream health check");
        for capability in Capability::ALL {
            let outcome = self.check_capability(capability).await;
            debug!(%capability, ?outcome, "Capability check finished");
        }
    }

    /// Probes one capability and commits the resulting state.
    ///
    /// Checks of the same capability run one at a time; a second caller
    /// waits and then probes against the state the first one committed.
    pub async fn check_capability(&self, capability: Capability) -> CheckOutcome {
        let entry = self.entry(capability);
        let _cycle = entry.cycle.lock().await;
        let candidates = &entry.candidates;

        let primary = self.assess(capability, &candidates.primary).await;
        info!(%capability, provider = %candidates.primary.id, score = %primary, "Primary probed");

        if primary.is_working() {
            let mut state = entry.state.write().await;
            state.primary_failures = 0;
            state.active = EndpointSlot::Primary;
            state.last_checked_at = Some(Utc::now());
            return CheckOutcome::PrimaryHealthy;
        }

        let threshold = self.settings.failure_threshold.max(1);
        let failures = {
            let mut state = entry.state.write().await;
            state.primary_failures = state.primary_failures.saturating_add(1);
            state.primary_failures
        };

        if failures < threshold {
            warn!(%capability, failures, threshold, "Primary failing, below switching threshold");
            entry.state.write().await.last_checked_at = Some(Utc::now());
            return CheckOutcome::PrimaryFailing { failures };
        }

        info!(%capability, provider = %candidates.secondary.id, "Primary failed, trying secondary");
        let secondary = self.assess(capability, &candidates.secondary).await;
        info!(%capability, provider = %candidates.secondary.id, score = %secondary, "Secondary probed");

        let mut state = entry.state.write().await;
        state.last_checked_at = Some(Utc::now());
        if secondary.is_working() {
            if state.active != EndpointSlot::Secondary {
                warn!(%capability, from = %candidates.primary.id, to = %candidates.secondary.id, "Switching endpoint");
            }
            state.secondary_failures = 0;
            state.active = EndpointSlot::Secondary;
            CheckOutcome::SwitchedToSecondary
        } else {
            state.secondary_failures = state.secondary_failures.saturating_add(1);
            let current = candidates.get(state.active);
            warn!(%capability, keeping = %current.id, "All candidates failed, keeping current endpoint");
            CheckOutcome::AllFailed
        }
    }

    /// Runs the capability's battery against one endpoint. Network errors,
    /// timeouts and malformed answers all just fail the query.
    async fn assess(&self, capability: Capability, endpoint: &Endpoint) -> ProbeReport {
        let url = format!("{}{}", endpoint.base_url.trim_end_matches('/'), capability.path());
        let battery = capability.battery();
        let total = battery.len();
        let mut passed = 0;

        for params in &battery {
            let attempt = tokio::time::timeout(
                self.settings.probe_timeout,
                self.transport.get_json(&url, params),
            )
            .await;

            match attempt {
                Ok(Ok(body)) if capability.is_valid_response(&body) => passed += 1,
                Ok(Ok(_)) => debug!(%url, "Probe answer structurally invalid"),
                Ok(Err(e)) => debug!(%url, error = %e, "Probe query failed"),
                Err(_) => debug!(%url, "Probe query timed out"),
            }
        }

        ProbeReport { passed, total }
    }
}
