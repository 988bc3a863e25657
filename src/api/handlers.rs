//! API Handlers
//!
//! HTTP request handlers for the administrative endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::cache::{CacheKind, CacheRegistry, CacheStats, CacheSummary};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::health::{ProbeTransport, UpstreamHealthTracker};
use crate::models::{
    CacheStatsResponse, CleanupResponse, ClearResponse, HealthResponse, ProviderStatus,
    StoreStatus, UpstreamCheckResponse, UpstreamsResponse,
};
use crate::persistence::PersistentStore;
use crate::tasks::{run_guarded_cycle, CycleResult};

const SELF_CHECK_KEY: &str = "health:self_check";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub caches: Arc<CacheRegistry>,
    pub health: Arc<UpstreamHealthTracker>,
    /// Persistent store shared with the retention task, if configured
    pub store: Option<Arc<dyn PersistentStore>>,
    pub health_check_interval: Duration,
    pub health_check_timeout: Duration,
}

impl AppState {
    /// Wires caches and tracker from configuration.
    pub fn from_config(
        config: &Config,
        transport: Arc<dyn ProbeTransport>,
        store: Option<Arc<dyn PersistentStore>>,
    ) -> Self {
        let caches = Arc::new(CacheRegistry::with_settings(&config.caches));
        let health = Arc::new(UpstreamHealthTracker::new(
            transport,
            config.tracker_settings(),
            config.stations.clone(),
            config.journeys.clone(),
        ));

        Self {
            caches,
            health,
            store,
            health_check_interval: Duration::from_secs(config.health_check_interval),
            health_check_timeout: Duration::from_secs(config.health_check_timeout),
        }
    }
}

/// Handler for GET /health
///
/// Round-trips a value through the `api` cache, reports the active
/// provider per capability and whether the persistent store answers.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let api = state.caches.get(CacheKind::Api);
    api.set(SELF_CHECK_KEY, b"ok".to_vec()).await;
    let cache_ok = api.get(SELF_CHECK_KEY).await.as_deref() == Some(b"ok".as_slice());
    if !cache_ok {
        warn!("Cache self-check failed");
    }

    let persistent_store = match &state.store {
        None => StoreStatus::Disabled,
        Some(store) => match store.get_latest(SELF_CHECK_KEY).await {
            Ok(_) => StoreStatus::Ok,
            Err(e) => {
                warn!(error = %e, "Persistent store self-check failed");
                StoreStatus::Unavailable
            }
        },
    };

    let upstreams = state
        .health
        .snapshot()
        .await
        .into_iter()
        .map(|snap| {
            let status = ProviderStatus {
                provider: snap.provider,
                base_url: snap.base_url,
            };
            (snap.capability.to_string(), status)
        })
        .collect();

    let max_age = chrono::Duration::from_std(state.health_check_interval)
        .unwrap_or_else(|_| chrono::Duration::minutes(10));

    Json(HealthResponse::evaluate(
        cache_ok,
        persistent_store,
        upstreams,
        state.health.last_full_check().await,
        max_age,
        Utc::now(),
    ))
}

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let caches = state.caches.stats_all().await;
    let summary = CacheSummary::from_stats(caches.values());

    Json(CacheStatsResponse { caches, summary })
}

/// Handler for GET /cache/stats/:name
pub async fn single_cache_stats_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CacheStats>> {
    let kind = CacheKind::from_name(&name).ok_or_else(|| AppError::NotFound(format!("cache '{}'", name)))?;
    Ok(Json(state.caches.get(kind).stats().await))
}

/// Handler for POST /cache/cleanup
pub async fn cache_cleanup_handler(State(state): State<AppState>) -> Json<CleanupResponse> {
    let removed: BTreeMap<String, usize> = state.caches.cleanup_all().await;
    let response = CleanupResponse::new(removed);
    info!(total = response.total_entries_removed, "Manual cache cleanup");
    Json(response)
}

/// Handler for DELETE /cache/clear
pub async fn cache_clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    Json(ClearResponse::new(state.caches.clear_all().await))
}

/// Handler for GET /upstreams
pub async fn upstreams_handler(State(state): State<AppState>) -> Json<UpstreamsResponse> {
    Json(UpstreamsResponse {
        upstreams: state.health.snapshot().await,
        check_interval_seconds: state.health_check_interval.as_secs(),
    })
}

/// Handler for POST /upstreams/check
///
/// Runs one probe cycle now, bounded by the cycle timeout. A timed-out
/// cycle still answers with whatever state it committed.
pub async fn upstreams_check_handler(State(state): State<AppState>) -> Result<Json<UpstreamCheckResponse>> {
    info!("Manual upstream health check requested");
    let result = match run_guarded_cycle(state.health.clone(), state.health_check_timeout).await {
        CycleResult::Completed => "completed",
        CycleResult::TimedOut => "timed_out",
        CycleResult::Panicked => return Err(AppError::Internal("health check cycle failed".to_string())),
    };

    Ok(Json(UpstreamCheckResponse {
        result: result.to_string(),
        upstreams: state.health.snapshot().await,
    }))
}
