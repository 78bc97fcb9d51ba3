//! In-memory ZIP assembly.
//!
//! Sources are read first, in order: the resolved images as requested, then
//! every CGU document. The ZIP is only written once everything has been read,
//! so a read failure never leaves a half-written archive behind.

use std::io::{Cursor, Write};

use bytes::Bytes;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ArchiveError;
use crate::store::{AuxDocument, ImageStore, ResolvedItem};

/// Directory inside the archive holding the CGU documents.
pub const CGU_ARCHIVE_DIR: &str = "CGU";

/// A named file queued for the archive.
#[derive(Debug, Clone)]
struct ArchiveEntry {
    name: String,
    data: Bytes,
}

/// A finished archive.
#[derive(Debug, Clone)]
pub struct BuiltArchive {
    /// ZIP bytes
    pub data: Bytes,

    /// Number of image entries (CGU documents excluded)
    pub file_count: usize,
}

/// Collects entries and writes them as a deflated ZIP.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    entries: Vec<ArchiveEntry>,
    image_count: usize,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an image under its flat `<matricule>.jpg` entry name.
    pub fn add_image(&mut self, item: &ResolvedItem, data: Bytes) {
        self.entries.push(ArchiveEntry {
            name: item.entry_name.clone(),
            data,
        });
        self.image_count += 1;
    }

    /// Queue a CGU document under `CGU/<name>`.
    pub fn add_document(&mut self, document: &AuxDocument, data: Bytes) {
        self.entries.push(ArchiveEntry {
            name: format!("{}/{}", CGU_ARCHIVE_DIR, document.name),
            data,
        });
    }

    /// Number of images queued so far.
    pub fn image_count(&self) -> usize {
        self.image_count
    }

    /// Write every queued entry, in order, into an in-memory ZIP.
    pub fn finish(self) -> Result<BuiltArchive, ArchiveError> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for entry in &self.entries {
            writer.start_file(entry.name.as_str(), options)?;
            writer
                .write_all(&entry.data)
                .map_err(|e| ArchiveError::Zip(format!("{}: {}", entry.name, e)))?;
        }
        let cursor = writer.finish()?;

        Ok(BuiltArchive {
            data: Bytes::from(cursor.into_inner()),
            file_count: self.image_count,
        })
    }
}

/// Read every resolved image and CGU document from `store` and zip them.
///
/// Images keep the order of `items`. CGU documents follow in the order the
/// store lists them. The compression itself runs on a blocking worker.
pub async fn build_archive<S>(store: &S, items: &[ResolvedItem]) -> Result<BuiltArchive, ArchiveError>
where
    S: ImageStore + ?Sized,
{
    let mut builder = ArchiveBuilder::new();

    for item in items {
        let data = store.read(&item.path).await?;
        debug!(entry = %item.entry_name, bytes = data.len(), "Queued image");
        builder.add_image(item, data);
    }

    let documents = store.list_documents().await?;
    for document in &documents {
        let data = store.read(&document.path).await?;
        builder.add_document(document, data);
    }
    debug!(documents = documents.len(), "Queued CGU documents");

    tokio::task::spawn_blocking(move || builder.finish())
        .await
        .map_err(|e| ArchiveError::Worker(e.to_string()))?
}
