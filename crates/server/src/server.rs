//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with the lookup and probe endpoints
//! - Middleware stack (logging, compression, CORS, timeouts)
//! - Prometheus recorder installation
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::middleware::{log_requests, request_id};
use crate::routes::{api_info, not_found};
use crate::routes::{health, ordnance};
use crate::state::ServerState;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
///
/// Lookups live under `/ordnance`; `/`, `/health`, `/ready` and `/metrics`
/// are operational endpoints. All endpoints are read-only `GET`s.
///
/// Middleware stack (applied in reverse order):
/// 1. Request ID tracking
/// 2. Request logging and metrics
/// 3. Timeout handling
/// 4. Compression
/// 5. CORS
pub fn build_router(state: Arc<ServerState>) -> Router {
    // The lookup API is consumed by a browser frontend on another origin
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let ops_routes = Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics));

    let lookup_routes = Router::new()
        .route("/ordnance/test", get(ordnance::fetch_test_data))
        .route("/ordnance/postcode/{postcode}", get(ordnance::find_by_postcode))
        .route(
            "/ordnance/sw/{postcode}",
            get(ordnance::find_by_south_west_postcode),
        )
        .route(
            "/ordnance/location/uk/{northing}/{easting}",
            get(ordnance::find_by_location),
        )
        .route(
            "/ordnance/location/gridref/{gridref}",
            get(ordnance::find_by_grid_ref),
        );

    Router::new()
        .merge(ops_routes)
        .merge(lookup_routes)
        .fallback(not_found)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.timeout(),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Ordnance HTTP server
///
/// Initializes logging and metrics, then serves until SIGTERM or Ctrl+C.
/// No store connection is opened here; the first lookup opens the session.
///
/// # Example
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json()
        .init();

    let mut state = ServerState::new(config.clone())?;
    if config.metrics_enabled {
        let handle = PrometheusBuilder::new().install_recorder()?;
        state = state.with_metrics(handle);
    }

    let app = build_router(Arc::new(state));

    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        store = ?config.store.backend,
        host = %config.store.host,
        db = %config.store.db,
        "Starting Ordnance server on {}",
        addr
    );
    tracing::info!(
        "Timeout: {}s, CORS: {}, Metrics: {}",
        config.timeout_secs,
        config.enable_cors,
        config.metrics_enabled
    );
    tracing::info!(
        location_table = ?config.lookup.location_table,
        default_tolerance = config.lookup.default_tolerance,
        "Lookup defaults loaded"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}

