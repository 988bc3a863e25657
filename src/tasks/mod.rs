//! Background Tasks Module
//!
//! Long-running tasks spawned at startup and aborted on shutdown.
//!
//! # Tasks
//! - Cache cleanup: sweeps expired entries out of every named cache
//! - Store cleanup: drops persistent records past their retention
//! - Health check: probes upstream candidates and updates failover state

mod cleanup;
mod health_check;

pub use cleanup::{spawn_cache_cleanup_task, spawn_store_cleanup_task};
pub use health_check::{run_guarded_cycle, spawn_health_check_task, CycleResult};
