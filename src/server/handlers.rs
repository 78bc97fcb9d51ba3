//! HTTP request handlers for the Apercus download API.
//!
//! # Endpoints
//!
//! - `POST /download-zip` - Build `selection.zip` from a list of matricules
//! - `GET /health` - Health check endpoint

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, FromRequestParts, State},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::archive::{SelectionService, ARCHIVE_FILENAME};
use crate::error::ArchiveError;
use crate::store::ImageStore;
use crate::telemetry::{round_seconds, TelemetryRecorder};

/// Body of the 400 response when no matricule list was supplied.
pub const MISSING_MATRICULES_MESSAGE: &str = "Aucun matricule fourni";

/// Body of the 500 response; internal details are never sent to clients.
pub const INTERNAL_ERROR_MESSAGE: &str = "Une erreur interne est survenue sur le serveur.";

/// Client address used when the peer is unknown.
pub const UNKNOWN_CLIENT: &str = "unknown";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// The telemetry recorder is constructed at startup and injected here; there
/// is no global logger.
pub struct AppState<S: ImageStore> {
    /// Validates, resolves and bundles matricules
    pub service: Arc<SelectionService<S>>,

    /// Structured telemetry log
    pub telemetry: TelemetryRecorder,
}

impl<S: ImageStore> AppState<S> {
    pub fn new(service: SelectionService<S>, telemetry: TelemetryRecorder) -> Self {
        Self {
            service: Arc::new(service),
            telemetry,
        }
    }
}

impl<S: ImageStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            telemetry: self.telemetry.clone(),
        }
    }
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Body of `POST /download-zip`.
#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    /// Matricules to bundle, in the order they should appear in the archive
    pub matricules: Vec<String>,
}

/// JSON error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Client Address
// =============================================================================

/// IP address of the TCP peer, or `"unknown"` when the router was not served
/// with connect info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddr(pub String);

impl<S> FromRequestParts<S> for ClientAddr
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());
        Ok(ClientAddr(addr))
    }
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Errors returned by the download handler.
#[derive(Debug)]
pub enum DownloadError {
    /// Body missing, unparseable, or without a `matricules` string array
    MissingMatricules,

    /// The archive could not be produced
    Generation(ArchiveError),
}

impl From<ArchiveError> for DownloadError {
    fn from(err: ArchiveError) -> Self {
        DownloadError::Generation(err)
    }
}

/// 4xx errors are logged at WARN level, 5xx at ERROR level with the full
/// internal error.
impl IntoResponse for DownloadError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            DownloadError::MissingMatricules => {
                warn!(status = 400, "Rejected request: no matricules supplied");
                (StatusCode::BAD_REQUEST, MISSING_MATRICULES_MESSAGE)
            }
            DownloadError::Generation(err) => {
                error!(status = 500, error = %err, "Archive generation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle archive requests.
///
/// # Endpoint
///
/// `POST /download-zip`
///
/// # Request Body
///
/// ```json
/// { "matricules": ["123", "456"] }
/// ```
///
/// The body is decoded as JSON whatever the Content-Type.
///
/// # Response
///
/// - `200 OK`: ZIP archive, `Content-Disposition: attachment; filename="selection.zip"`
/// - `400 Bad Request`: `{"error": "Aucun matricule fourni"}`
/// - `500 Internal Server Error`: `{"error": "Une erreur interne est survenue sur le serveur."}`
///
/// Matricules that are invalid or have no image are skipped, not errors.
pub async fn download_zip_handler<S: ImageStore>(
    State(state): State<AppState<S>>,
    ClientAddr(client): ClientAddr,
    body: Bytes,
) -> Result<Response, DownloadError> {
    let started = Instant::now();

    let request: DownloadRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(client = %client, reason = %e, "Unreadable download request");
        DownloadError::MissingMatricules
    })?;

    info!(
        client = %client,
        requested = request.matricules.len(),
        "Selection request received"
    );

    let selection = match state.service.generate(&request.matricules).await {
        Ok(selection) => selection,
        Err(err) => {
            if let Err(log_err) = state
                .telemetry
                .record_failure(&client, &err.to_string())
                .await
            {
                error!(error = %log_err, "Failed to write telemetry record");
            }
            return Err(err.into());
        }
    };

    let duration = started.elapsed();
    if let Err(log_err) = state
        .telemetry
        .record_success(
            &client,
            selection.file_count,
            selection.size(),
            &selection.found,
            duration,
        )
        .await
    {
        error!(error = %log_err, "Failed to write telemetry record");
    }

    info!(
        client = %client,
        files = selection.file_count,
        bytes = selection.size(),
        duration_seconds = round_seconds(duration),
        "Sending {}",
        ARCHIVE_FILENAME
    );

    let response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", ARCHIVE_FILENAME),
            ),
        ],
        selection.data,
    )
        .into_response();

    Ok(response)
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
