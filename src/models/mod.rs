//! Response models for the administrative API
//!
//! DTOs serialized as HTTP response bodies.

pub mod responses;

pub use responses::{
    CacheStatsResponse, CleanupResponse, ClearResponse, HealthResponse, ProviderStatus,
    StoreStatus, UpstreamCheckResponse, UpstreamsResponse,
};
