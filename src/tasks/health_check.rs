//! Health Check Task
//!
//! Drives the upstream probe cycle: once at startup, then on a fixed
//! interval, each cycle bounded by an overall timeout.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::health::UpstreamHealthTracker;

/// How a guarded probe cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleResult {
    Completed,
    TimedOut,
    Panicked,
}

/// Runs one probe cycle on its own task, aborting it after `limit`.
///
/// State committed by the tracker before the abort stays; nothing is rolled
/// back and the next cycle starts from it. A panic inside the cycle is
/// contained here.
pub async fn run_guarded_cycle(tracker: Arc<UpstreamHealthTracker>, limit: Duration) -> CycleResult {
    let mut cycle = tokio::spawn(async move { tracker.run_probe_cycle().await });

    match tokio::time::timeout(limit, &mut cycle).await {
        Ok(Ok(())) => CycleResult::Completed,
        Ok(Err(e)) => {
            error!(error = %e, "Health check cycle panicked");
            CycleResult::Panicked
        }
        Err(_) => {
            cycle.abort();
            warn!(limit_secs = limit.as_secs(), "Health check cycle timed out, keeping current endpoints");
            CycleResult::TimedOut
        }
    }
}

/// Spawns the periodic health check. The first cycle runs immediately.
pub fn spawn_health_check_task(
    tracker: Arc<UpstreamHealthTracker>,
    interval: Duration,
    cycle_timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs(),
            timeout_secs = cycle_timeout.as_secs(),
            "Starting health check task"
        );

        loop {
            let result = run_guarded_cycle(tracker.clone(), cycle_timeout).await;
            info!(?result, "Health check cycle finished");
            tokio::time::sleep(interval).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::health::{CandidatePair, Capability, Endpoint, ProbeTransport, TrackerSettings};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct HangingTransport;

    #[async_trait]
    impl ProbeTransport for HangingTransport {
        async fn get_json(&self, _url: &str, _params: &[(&'static str, String)]) -> Result<Value, FetchError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(FetchError::Timeout)
        }
    }

    struct FailingPrimary;

    #[async_trait]
    impl ProbeTransport for FailingPrimary {
        async fn get_json(&self, url: &str, _params: &[(&'static str, String)]) -> Result<Value, FetchError> {
            if url.starts_with("https://secondary.test") {
                if url.ends_with("/journeys") {
                    Ok(json!({"journeys": [{"legs": [{}]}]}))
                } else {
                    Ok(json!([{"type": "stop"}]))
                }
            } else {
                Err(FetchError::Status(502))
            }
        }
    }

    fn tracker(transport: Arc<dyn ProbeTransport>, probe_timeout: Duration) -> Arc<UpstreamHealthTracker> {
        let pair = CandidatePair::new(
            Endpoint::new("bvg", "https://primary.test"),
            Endpoint::new("vbb", "https://secondary.test"),
        );
        let settings = TrackerSettings {
            failure_threshold: 1,
            probe_timeout,
        };
        Arc::new(UpstreamHealthTracker::new(transport, settings, pair.clone(), pair))
    }

    #[tokio::test]
    async fn test_guarded_cycle_completes() {
        let tracker = tracker(Arc::new(FailingPrimary), Duration::from_secs(1));

        let result = run_guarded_cycle(tracker.clone(), Duration::from_secs(5)).await;

        assert_eq!(result, CycleResult::Completed);
        assert_eq!(
            tracker.get_active_base_url(Capability::Journeys).await,
            "https://secondary.test"
        );
    }

    #[tokio::test]
    async fn test_guarded_cycle_times_out_and_keeps_state() {
        let tracker = tracker(Arc::new(HangingTransport), Duration::from_secs(3600));

        let result = run_guarded_cycle(tracker.clone(), Duration::from_millis(100)).await;

        assert_eq!(result, CycleResult::TimedOut);
        assert_eq!(
            tracker.get_active_base_url(Capability::Stations).await,
            "https://primary.test"
        );
        assert_eq!(tracker.state(Capability::Stations).await.last_checked_at, None);
    }

    #[tokio::test]
    async fn test_task_runs_first_cycle_immediately() {
        let tracker = tracker(Arc::new(FailingPrimary), Duration::from_secs(1));

        let handle = spawn_health_check_task(tracker.clone(), Duration::from_secs(3600), Duration::from_secs(5));
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(tracker.last_full_check().await.is_some());
        assert_eq!(
            tracker.get_active_base_url(Capability::Stations).await,
            "https://secondary.test"
        );

        handle.abort();
    }
}
