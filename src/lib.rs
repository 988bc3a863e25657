//! Campus Cache - caching and upstream failover for a campus mobility API
//!
//! Bounded TTL caches with LRU eviction, calendar-aware freshness checks,
//! a read-through loader over an optional persistent store, and health
//! tracking that fails over between interchangeable transit backends.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod freshness;
pub mod health;
pub mod loader;
pub mod models;
pub mod persistence;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::{CacheKey, CacheKind, CacheRegistry};
pub use config::Config;
pub use freshness::{FreshnessPolicy, RefreshPeriod};
pub use health::{Capability, UpstreamHealthTracker};
pub use loader::{DataSource, Loaded, TieredLoader, Timestamped};
pub use tasks::{spawn_cache_cleanup_task, spawn_health_check_task, spawn_store_cleanup_task};
