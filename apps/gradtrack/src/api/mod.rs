//! # GradTrack HTTP API Module
//!
//! This module implements the admin HTTP API using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Distribution progress per cohort
//! - `GET /results?cohort=` - Assigned teams of a cohort
//! - `POST /allocate` - Run the allocation, optionally applying it
//! - `POST /allocate/preview` - Allocate a snapshot posted in the body
//! - `POST /reset` - Clear assignments
//! - `POST /selections/reset` - Clear the selections of a cohort
//! - `PUT /snapshot` - Replace the server's snapshot
//!
//! ## Security Configuration
//!
//! - `[server] cors_origins` / `GRADTRACK_CORS_ORIGINS`: allowed origins, or "*" for all (default: localhost only)
//! - `[server] rate_limit` / `GRADTRACK_RATE_LIMIT`: requests per second (default: 100, 0 to disable)
//! - `GRADTRACK_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::get_api_key_from_env;
pub use middleware::create_rate_limiter;
pub use types::{
    AllocateRequest, AllocateResponse, HealthResponse, PreviewRequest, ResetRequest,
    ResetResponse, ResetSelectionsRequest, ResultsQuery, ResultsResponse, SnapshotResponse,
    StatusResponse,
};

use crate::config::{AppConfig, ServerSection};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post, put},
};
use gradtrack_core::{GradTrackError, Snapshot};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request body limit (2 MB).
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    /// The records every handler reads and mutates.
    pub snapshot: Arc<RwLock<Snapshot>>,
    /// Backing file; mutations are written here before they take effect.
    pub snapshot_path: Option<PathBuf>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// In-memory state with default configuration.
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        Self::with_store(snapshot, None, AppConfig::default())
    }

    /// State backed by a snapshot file.
    #[must_use]
    pub fn with_store(snapshot: Snapshot, snapshot_path: Option<PathBuf>, config: AppConfig) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(snapshot)),
            snapshot_path,
            config: Arc::new(config),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from `[server] cors_origins`.
///
/// - `["*"]`: allows all origins
/// - empty: localhost only
/// - otherwise: the listed origins
fn build_cors_layer(server: &ServerSection) -> CorsLayer {
    if server.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
        return CorsLayer::permissive();
    }

    if server.cors_origins.is_empty() {
        tracing::info!("CORS: No origins configured, defaulting to localhost only");
        return build_localhost_cors(server.port);
    }

    let allowed_origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(hv) => {
                tracing::info!("CORS: Allowing origin: {}", origin);
                Some(hv)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    if allowed_origins.is_empty() {
        tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
        return build_localhost_cors(server.port);
    }

    restricted_cors(allowed_origins)
}

/// Localhost on the common dev-server port and on the API's own port.
fn build_localhost_cors(port: u16) -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
        format!("http://localhost:{}", port),
        format!("http://127.0.0.1:{}", port),
    ]
    .iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    restricted_cors(origins)
}

fn restricted_cors(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting (if enabled)
/// 5. Authentication (if `GRADTRACK_API_KEY` is set)
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;
    let cors = build_cors_layer(server);

    let rate_limiter = if server.rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", server.rate_limit);
        Some(middleware::create_rate_limiter(server.rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible! \
             Set {} to enable authentication.",
            auth::API_KEY_ENV
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/results", get(handlers::results_handler))
        .route("/allocate", post(handlers::allocate_handler))
        .route("/allocate/preview", post(handlers::preview_handler))
        .route("/reset", post(handlers::reset_handler))
        .route("/selections/reset", post(handlers::reset_selections_handler))
        .route("/snapshot", put(handlers::replace_snapshot_handler));

    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Serve `state` on `addr` until Ctrl+C.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), GradTrackError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| GradTrackError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("GradTrack HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| GradTrackError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
