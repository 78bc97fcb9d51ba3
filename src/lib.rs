//! # Apercus Server
//!
//! Builds on-the-fly ZIP downloads of preview images selected by matricule.
//!
//! A client posts a list of matricules; each one is validated, resolved to
//! `<images-dir>/<matricule>.jpg`, and the matches are zipped in memory
//! together with every document of the CGU directory. Each request leaves one
//! structured record in a rotating telemetry log.
//!
//! ## Architecture
//!
//! - [`store`] - Matricule validation and the image store (filesystem)
//! - [`archive`] - In-memory ZIP assembly and the selection service
//! - [`telemetry`] - Rotating JSON-lines telemetry log
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use apercus_server::{create_router, FsImageStore, RouterConfig, SelectionService, TelemetryRecorder};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = FsImageStore::new("Apercus", "CGU");
//!     let telemetry = TelemetryRecorder::open("download.log", 10 * 1024 * 1024, 5).unwrap();
//!     let router = create_router(
//!         SelectionService::new(store),
//!         telemetry,
//!         RouterConfig::new().with_index_file("index.html"),
//!     );
//!
//!     // Serve the router...
//! }
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod telemetry;

// Re-export commonly used types
pub use archive::{
    build_archive, ArchiveBuilder, BuiltArchive, Selection, SelectionService, ARCHIVE_FILENAME,
    CGU_ARCHIVE_DIR,
};
pub use config::Config;
pub use error::{ArchiveError, MatriculeError, StoreError, TelemetryError};
pub use server::{
    create_router, download_zip_handler, health_handler, AppState, ClientAddr, DownloadError,
    DownloadRequest, ErrorResponse, HealthResponse, RouterConfig,
};
pub use store::{validate, AuxDocument, FsImageStore, ImageStore, Matricule, Resolution, ResolvedItem};
pub use telemetry::{RotatingFile, TelemetryRecord, TelemetryRecorder};
