//! Selection service - turns a list of raw matricules into an archive.

use std::collections::HashSet;

use bytes::Bytes;
use tracing::{info, warn};

use crate::error::ArchiveError;
use crate::store::{ImageStore, Matricule, Resolution, ResolvedItem};

use super::builder::build_archive;

/// Result of a successful generation.
#[derive(Debug, Clone)]
pub struct Selection {
    /// ZIP bytes
    pub data: Bytes,

    /// Number of images in the archive
    pub file_count: usize,

    /// Matricules that made it into the archive, in request order
    pub found: Vec<String>,
}

impl Selection {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Validates, resolves and bundles matricules against an image store.
pub struct SelectionService<S: ImageStore> {
    store: S,
}

impl<S: ImageStore> SelectionService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validate and resolve each matricule, keeping request order.
    ///
    /// Invalid and missing matricules are skipped with a warning. A matricule
    /// requested twice is only kept once.
    pub async fn resolve_all(&self, raw: &[String]) -> Vec<ResolvedItem> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();

        for candidate in raw {
            let matricule = match Matricule::parse(candidate) {
                Ok(m) => m,
                Err(e) => {
                    warn!(matricule = %candidate, reason = %e, "Matricule ignored");
                    continue;
                }
            };

            if !seen.insert(matricule.clone()) {
                warn!(matricule = %matricule, "Duplicate matricule ignored");
                continue;
            }

            match self.store.resolve(&matricule).await {
                Resolution::Found(item) => {
                    info!(matricule = %matricule, path = %item.path.display(), "Image found");
                    resolved.push(item);
                }
                Resolution::NotFound(path) => {
                    warn!(matricule = %matricule, path = %path.display(), "Image not found, skipped");
                }
            }
        }

        resolved
    }

    /// Build the archive for one request.
    ///
    /// Fails only when a source that was found cannot be read or the ZIP
    /// cannot be written; no partial archive is ever returned.
    pub async fn generate(&self, raw: &[String]) -> Result<Selection, ArchiveError> {
        let items = self.resolve_all(raw).await;
        let built = build_archive(&self.store, &items).await?;

        Ok(Selection {
            data: built.data,
            file_count: built.file_count,
            found: items
                .into_iter()
                .map(|item| item.matricule.as_str().to_string())
                .collect(),
        })
    }
}
