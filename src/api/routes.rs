//! API Routes
//!
//! Configures the Axum router with all administrative endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_cleanup_handler, cache_clear_handler, cache_stats_handler, health_handler,
    single_cache_stats_handler, upstreams_check_handler, upstreams_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .route("/cache/stats/:name", get(single_cache_stats_handler))
        .route("/cache/cleanup", post(cache_cleanup_handler))
        .route("/cache/clear", delete(cache_clear_handler))
        .route("/upstreams", get(upstreams_handler))
        .route("/upstreams/check", post(upstreams_check_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::testing::test_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        create_router(test_state())
    }

    async fn status_of(method: &str, uri: &str) -> StatusCode {
        create_test_app()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        assert_eq!(status_of("GET", "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        assert_eq!(status_of("GET", "/cache/stats").await, StatusCode::OK);
        assert_eq!(status_of("GET", "/cache/stats/geocoding").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_cache_not_found() {
        assert_eq!(status_of("GET", "/cache/stats/redis").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_maintenance_endpoints_methods() {
        assert_eq!(status_of("POST", "/cache/cleanup").await, StatusCode::OK);
        assert_eq!(status_of("DELETE", "/cache/clear").await, StatusCode::OK);
        assert_eq!(status_of("GET", "/cache/clear").await, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_upstream_endpoints() {
        assert_eq!(status_of("GET", "/upstreams").await, StatusCode::OK);
        assert_eq!(status_of("POST", "/upstreams/check").await, StatusCode::OK);
    }
}
