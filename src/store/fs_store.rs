//! Filesystem-backed image store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};

use crate::error::StoreError;

use super::{AuxDocument, ImageStore, Matricule, Resolution, ResolvedItem};

/// `ImageStore` over two local directories.
///
/// # Example
///
/// ```ignore
/// use apercus_server::store::FsImageStore;
///
/// let store = FsImageStore::new("Apercus", "CGU");
/// // "123" resolves to Apercus/123.jpg
/// ```
#[derive(Debug, Clone)]
pub struct FsImageStore {
    images_dir: PathBuf,
    cgu_dir: PathBuf,
}

impl FsImageStore {
    pub fn new(images_dir: impl Into<PathBuf>, cgu_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
            cgu_dir: cgu_dir.into(),
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    pub fn cgu_dir(&self) -> &Path {
        &self.cgu_dir
    }

    /// Candidate location of a matricule's image.
    pub fn image_path(&self, matricule: &Matricule) -> PathBuf {
        self.images_dir.join(matricule.image_filename())
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn resolve(&self, matricule: &Matricule) -> Resolution {
        let path = self.image_path(matricule);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Resolution::Found(ResolvedItem::new(matricule.clone(), path)),
            _ => Resolution::NotFound(path),
        }
    }

    async fn read(&self, path: &Path) -> Result<Bytes, StoreError> {
        tokio::fs::read(path)
            .await
            .map(Bytes::from)
            .map_err(|e| StoreError::Read {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }

    async fn list_documents(&self) -> Result<Vec<AuxDocument>, StoreError> {
        let list_err = |e: std::io::Error| StoreError::List {
            path: self.cgu_dir.display().to_string(),
            message: e.to_string(),
        };

        let mut entries = match tokio::fs::read_dir(&self.cgu_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(dir = %self.cgu_dir.display(), "CGU directory absent, skipping");
                return Ok(Vec::new());
            }
            Err(e) => return Err(list_err(e)),
        };

        let mut documents = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
            let path = entry.path();
            // Follows symlinks; subdirectories are not descended into.
            let is_file = tokio::fs::metadata(&path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            // Entry names are carried verbatim, so they must be valid UTF-8.
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!(name = ?raw, "Skipping CGU document with a non UTF-8 name");
                    continue;
                }
            };
            documents.push(AuxDocument { name, path });
        }

        documents.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(documents)
    }
}
