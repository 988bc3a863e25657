//! Campus Cache - caching and upstream failover service
//!
//! Serves the administrative API and runs the background cache sweep,
//! store retention and upstream health check tasks.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campus_cache::health::HttpProbeTransport;
use campus_cache::persistence::{InMemoryStore, PersistentStore};
use campus_cache::{
    create_router, spawn_cache_cleanup_task, spawn_health_check_task, spawn_store_cleanup_task,
    AppState, Config,
};

/// Startup sequence:
/// 1. Initialize tracing
/// 2. Load configuration from environment variables
/// 3. Build caches, persistent store and health tracker
/// 4. Start background tasks
/// 5. Serve the router until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info", can be overridden with RUST_LOG
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Campus Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, cache_cleanup={}s, health_check={}s (timeout {}s), failover_threshold={}",
        config.server_port,
        config.cache_cleanup_interval,
        config.health_check_interval,
        config.health_check_timeout,
        config.failover_threshold
    );

    let transport = HttpProbeTransport::new(Duration::from_secs(config.probe_timeout))
        .context("Failed to build probe HTTP client")?;
    let store: Arc<dyn PersistentStore> = Arc::new(InMemoryStore::new());
    let state = AppState::from_config(&config, Arc::new(transport), Some(store.clone()));
    info!("Caches and health tracker initialized");

    let handles = vec![
        spawn_cache_cleanup_task(
            state.caches.clone(),
            Duration::from_secs(config.cache_cleanup_interval),
        ),
        spawn_store_cleanup_task(
            store,
            chrono::Duration::days(config.store_retention_days),
            Duration::from_secs(config.store_cleanup_interval),
        ),
        spawn_health_check_task(
            state.health.clone(),
            Duration::from_secs(config.health_check_interval),
            Duration::from_secs(config.health_check_timeout),
        ),
    ];
    info!("Background tasks started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(handles))
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then aborts the
/// background tasks.
async fn shutdown_signal(handles: Vec<JoinHandle<()>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    for handle in &handles {
        handle.abort();
    }
    warn!(tasks = handles.len(), "Background tasks aborted");
}
