//! Image store abstraction.
//!
//! The store owns two read-only directories: the image directory, where each
//! matricule maps to `<matricule>.jpg`, and the CGU directory, whose regular
//! files ship with every archive.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            SelectionService             │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │           ImageStore Trait              │
//! │   (resolve / read / list documents)     │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             FsImageStore                │
//! │        (local filesystem, tokio)        │
//! └─────────────────────────────────────────┘
//! ```

mod fs_store;
mod matricule;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;

pub use fs_store::FsImageStore;
pub use matricule::{validate, Matricule};

/// Extension of every image in the store.
pub const IMAGE_EXTENSION: &str = "jpg";

/// A matricule whose backing image exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedItem {
    /// The matricule as requested
    pub matricule: Matricule,

    /// Location of the image inside the store
    pub path: PathBuf,

    /// Name of the entry in the archive (`<matricule>.jpg`)
    pub entry_name: String,
}

impl ResolvedItem {
    pub fn new(matricule: Matricule, path: impl Into<PathBuf>) -> Self {
        let entry_name = matricule.image_filename();
        Self {
            matricule,
            path: path.into(),
            entry_name,
        }
    }
}

/// Outcome of looking a matricule up in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(ResolvedItem),

    /// No regular file at the candidate path
    NotFound(PathBuf),
}

/// A file from the auxiliary document directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxDocument {
    /// Bare file name, placed under `CGU/` in the archive
    pub name: String,

    /// Location of the document
    pub path: PathBuf,
}

/// Read-only source of images and CGU documents.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Look up the image backing a matricule.
    ///
    /// Existence is checked once, at call time.
    async fn resolve(&self, matricule: &Matricule) -> Resolution;

    /// Read the full content of a resolved image or document.
    async fn read(&self, path: &Path) -> Result<Bytes, StoreError>;

    /// List the regular files directly inside the CGU directory.
    ///
    /// Returns an empty list when the directory does not exist.
    async fn list_documents(&self) -> Result<Vec<AuxDocument>, StoreError>;
}
