//! HTTP server layer for the Apercus server.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │                     POST /download-zip                          │
//! │                                                                 │
//! │  ┌──────────────────────────┐   ┌────────────────────────────┐  │
//! │  │        handlers          │   │          routes            │  │
//! │  │ (requests, error → JSON) │   │ (CORS, tracing, index)     │  │
//! │  └──────────────────────────┘   └────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    download_zip_handler, health_handler, AppState, ClientAddr, DownloadError, DownloadRequest,
    ErrorResponse, HealthResponse, INTERNAL_ERROR_MESSAGE, MISSING_MATRICULES_MESSAGE,
};
pub use routes::{create_router, RouterConfig};
