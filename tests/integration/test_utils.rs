//! Test utilities for integration tests.
//!
//! Provides an in-memory image store with injectable read failures, an
//! on-disk fixture with real `Apercus/` and `CGU/` directories, and helpers to
//! drive the router and inspect archives and telemetry.

use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use zip::ZipArchive;

use apercus_server::error::StoreError;
use apercus_server::store::{AuxDocument, ImageStore, Matricule, Resolution, ResolvedItem};
use apercus_server::telemetry::{TelemetryRecord, TelemetryRecorder};
use apercus_server::{create_router, FsImageStore, RouterConfig, SelectionService};

// =============================================================================
// Mock Image Store
// =============================================================================

/// In-memory image store.
///
/// Images live under `/mock/images/<matricule>.jpg` and documents under
/// `/mock/cgu/<name>`. Paths registered with `failing_read` resolve normally
/// but fail when read.
#[derive(Clone, Default)]
pub struct MockImageStore {
    files: HashMap<PathBuf, Bytes>,
    images: HashSet<String>,
    documents: Vec<String>,
    failing: HashSet<PathBuf>,
    resolve_count: Arc<AtomicUsize>,
    read_count: Arc<AtomicUsize>,
}

impl MockImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, matricule: &str, data: impl Into<Bytes>) -> Self {
        self.files.insert(image_path(matricule), data.into());
        self.images.insert(matricule.to_string());
        self
    }

    pub fn with_document(mut self, name: &str, data: impl Into<Bytes>) -> Self {
        self.files.insert(document_path(name), data.into());
        self.documents.push(name.to_string());
        self
    }

    /// Register an image that exists but cannot be read.
    pub fn with_unreadable_image(mut self, matricule: &str) -> Self {
        self.images.insert(matricule.to_string());
        self.failing.insert(image_path(matricule));
        self
    }

    /// Lookups performed, shared by every clone.
    pub fn resolve_count(&self) -> usize {
        self.resolve_count.load(Ordering::SeqCst)
    }

    pub fn read_count(&self) -> usize {
        self.read_count.load(Ordering::SeqCst)
    }
}

fn image_path(matricule: &str) -> PathBuf {
    PathBuf::from(format!("/mock/images/{}.jpg", matricule))
}

fn document_path(name: &str) -> PathBuf {
    PathBuf::from(format!("/mock/cgu/{}", name))
}

#[async_trait]
impl ImageStore for MockImageStore {
    async fn resolve(&self, matricule: &Matricule) -> Resolution {
        self.resolve_count.fetch_add(1, Ordering::SeqCst);
        let path = image_path(matricule.as_str());
        if self.images.contains(matricule.as_str()) {
            Resolution::Found(ResolvedItem::new(matricule.clone(), path))
        } else {
            Resolution::NotFound(path)
        }
    }

    async fn read(&self, path: &Path) -> Result<Bytes, StoreError> {
        self.read_count.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(path) {
            return Err(StoreError::Read {
                path: path.display().to_string(),
                message: "Permission denied (os error 13)".to_string(),
            });
        }
        self.files.get(path).cloned().ok_or_else(|| StoreError::Read {
            path: path.display().to_string(),
            message: "No such file or directory (os error 2)".to_string(),
        })
    }

    async fn list_documents(&self) -> Result<Vec<AuxDocument>, StoreError> {
        Ok(self
            .documents
            .iter()
            .map(|name| AuxDocument {
                name: name.clone(),
                path: document_path(name),
            })
            .collect())
    }
}

// =============================================================================
// On-disk Fixture
// =============================================================================

/// Temporary deployment layout: `Apercus/`, `CGU/`, `index.html` and a
/// telemetry log.
pub struct Fixture {
    pub root: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        std::fs::create_dir(root.path().join("Apercus")).unwrap();
        std::fs::create_dir(root.path().join("CGU")).unwrap();
        Self { root }
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.path().join("Apercus")
    }

    pub fn cgu_dir(&self) -> PathBuf {
        self.root.path().join("CGU")
    }

    pub fn telemetry_log(&self) -> PathBuf {
        self.root.path().join("download.log")
    }

    pub fn index_file(&self) -> PathBuf {
        self.root.path().join("index.html")
    }

    pub fn with_image(self, matricule: &str, data: &[u8]) -> Self {
        std::fs::write(self.images_dir().join(format!("{}.jpg", matricule)), data).unwrap();
        self
    }

    pub fn with_document(self, name: &str, data: &[u8]) -> Self {
        std::fs::write(self.cgu_dir().join(name), data).unwrap();
        self
    }

    pub fn with_index(self, html: &str) -> Self {
        std::fs::write(self.index_file(), html).unwrap();
        self
    }

    pub fn store(&self) -> FsImageStore {
        FsImageStore::new(self.images_dir(), self.cgu_dir())
    }

    pub fn recorder(&self) -> TelemetryRecorder {
        TelemetryRecorder::open(self.telemetry_log(), 10 * 1024 * 1024, 5).unwrap()
    }

    pub fn router(&self) -> Router {
        router_for(self.store(), self.recorder(), Some(self.index_file()))
    }

    pub fn telemetry(&self) -> Vec<TelemetryRecord> {
        read_telemetry(&self.telemetry_log())
    }
}

// =============================================================================
// Helpers
// =============================================================================

pub fn router_for<S: ImageStore + 'static>(
    store: S,
    recorder: TelemetryRecorder,
    index_file: Option<PathBuf>,
) -> Router {
    let mut config = RouterConfig::new().with_tracing(false);
    if let Some(index_file) = index_file {
        config = config.with_index_file(index_file);
    }
    create_router(SelectionService::new(store), recorder, config)
}

/// POST a raw body to `/download-zip`.
pub async fn post_download(router: Router, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri("/download-zip")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    router.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// Every entry of a ZIP as (name, content), in archive order.
pub fn zip_entries(data: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(Cursor::new(data.to_vec())).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut content = Vec::new();
            file.read_to_end(&mut content).unwrap();
            (file.name().to_string(), content)
        })
        .collect()
}

/// Entry names that are images (outside `CGU/`).
pub fn image_entries(data: &[u8]) -> Vec<String> {
    zip_entries(data)
        .into_iter()
        .map(|(name, _)| name)
        .filter(|name| !name.starts_with("CGU/"))
        .collect()
}

/// Entry names under `CGU/`, as a set.
pub fn cgu_entries(data: &[u8]) -> HashSet<String> {
    zip_entries(data)
        .into_iter()
        .map(|(name, _)| name)
        .filter(|name| name.starts_with("CGU/"))
        .collect()
}

pub fn read_telemetry(path: &Path) -> Vec<TelemetryRecord> {
    match std::fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect(),
        Err(_) => Vec::new(),
    }
}

pub fn set(names: &[&str]) -> HashSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}
