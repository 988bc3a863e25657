//! API Module
//!
//! HTTP handlers and routing for the administrative REST API.
//!
//! # Endpoints
//! - `GET /health` - Cache self-check and active upstream providers
//! - `GET /cache/stats` - Per-cache statistics and summary
//! - `GET /cache/stats/:name` - Statistics of one cache
//! - `POST /cache/cleanup` - Sweep expired entries now
//! - `DELETE /cache/clear` - Empty every cache
//! - `GET /upstreams` - Failover state per capability
//! - `POST /upstreams/check` - Run one probe cycle now

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
