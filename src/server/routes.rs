//! Router configuration for the Apercus server.
//!
//! # Route Structure
//!
//! ```text
//! /               - Front-end entry document (static index.html)
//! /health         - Health check
//! /download-zip   - Archive generation (POST)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use apercus_server::archive::SelectionService;
//! use apercus_server::server::{create_router, RouterConfig};
//! use apercus_server::store::FsImageStore;
//! use apercus_server::telemetry::TelemetryRecorder;
//!
//! let service = SelectionService::new(FsImageStore::new("Apercus", "CGU"));
//! let telemetry = TelemetryRecorder::open("download.log", 10 * 1024 * 1024, 5)?;
//! let router = create_router(service, telemetry, RouterConfig::new().with_index_file("index.html"));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, router.into_make_service_with_connect_info::<std::net::SocketAddr>()).await?;
//! ```

use std::path::PathBuf;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;

use super::handlers::{download_zip_handler, health_handler, AppState};
use crate::archive::SelectionService;
use crate::store::ImageStore;
use crate::telemetry::TelemetryRecorder;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone, Debug)]
pub struct RouterConfig {
    /// Document served at `/` (None = no front-end route)
    pub index_file: Option<PathBuf>,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a router configuration.
    ///
    /// By default:
    /// - No front-end document is served
    /// - CORS allows any origin
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            index_file: None,
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Serve `path` at `/`.
    pub fn with_index_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.index_file = Some(path.into());
        self
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the application router.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()` so
/// telemetry records carry the client address.
pub fn create_router<S>(
    service: SelectionService<S>,
    telemetry: TelemetryRecorder,
    config: RouterConfig,
) -> Router
where
    S: ImageStore + 'static,
{
    let app_state = AppState::new(service, telemetry);
    let cors = build_cors_layer(&config);

    let mut router = Router::new()
        .route("/health", get(health_handler))
        // Selections of any length are accepted; no body cap on this route.
        .route(
            "/download-zip",
            post(download_zip_handler::<S>).layer(DefaultBodyLimit::disable()),
        )
        .with_state(app_state);

    if let Some(index_file) = &config.index_file {
        router = router.route_service("/", ServeFile::new(index_file));
    }

    let router = router.layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .expose_headers([CONTENT_DISPOSITION])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
