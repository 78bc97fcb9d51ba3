//! Archive generation layer.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │ raw matricules
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │           SelectionService              │
//! │   validate → resolve → build_archive    │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │       ArchiveBuilder (ZIP, deflate)     │
//! │   <matricule>.jpg ...  CGU/<document>   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`SelectionService`]: Entry point for one request
//! - [`ArchiveBuilder`]: Queues entries and writes the ZIP in memory
//! - [`build_archive`]: Reads images and CGU documents from an [`ImageStore`](crate::store::ImageStore)

mod builder;
mod service;

pub use builder::{build_archive, ArchiveBuilder, BuiltArchive, CGU_ARCHIVE_DIR};
pub use service::{Selection, SelectionService};

/// File name of the archive offered for download.
pub const ARCHIVE_FILENAME: &str = "selection.zip";
