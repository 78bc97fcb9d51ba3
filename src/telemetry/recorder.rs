//! Shared telemetry recorder.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::TelemetryError;

use super::record::TelemetryRecord;
use super::rotating::RotatingFile;

/// Cloneable handle on the telemetry log.
///
/// All clones append to the same file; a mutex serializes rotation and
/// appends so records are never interleaved.
#[derive(Clone)]
pub struct TelemetryRecorder {
    path: PathBuf,
    log: Arc<Mutex<RotatingFile>>,
}

impl TelemetryRecorder {
    /// Open the telemetry log at `path`.
    pub fn open(
        path: impl Into<PathBuf>,
        max_bytes: u64,
        backups: usize,
    ) -> Result<Self, TelemetryError> {
        let path = path.into();
        let log = RotatingFile::open(&path, max_bytes, backups)?;
        Ok(Self {
            path,
            log: Arc::new(Mutex::new(log)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record.
    pub fn record(&self, record: &TelemetryRecord) -> Result<(), TelemetryError> {
        let line = record
            .to_json_line()
            .map_err(|e| TelemetryError::Serialize(e.to_string()))?;
        let mut log = self.log.lock().map_err(|_| TelemetryError::Poisoned)?;
        log.write_line(&line)
    }

    /// Record a generated archive.
    ///
    /// The append (and any rotation) runs on a blocking worker.
    pub async fn record_success(
        &self,
        client_ip: &str,
        files_count: usize,
        zip_size_bytes: usize,
        matricules_found: &[String],
        duration: Duration,
    ) -> Result<(), TelemetryError> {
        self.record_blocking(TelemetryRecord::success(
            client_ip,
            files_count,
            zip_size_bytes,
            matricules_found.to_vec(),
            duration,
        ))
        .await
    }

    /// Record a failed generation.
    pub async fn record_failure(&self, client_ip: &str, error: &str) -> Result<(), TelemetryError> {
        self.record_blocking(TelemetryRecord::failure(client_ip, error))
            .await
    }

    async fn record_blocking(&self, record: TelemetryRecord) -> Result<(), TelemetryError> {
        let recorder = self.clone();
        tokio::task::spawn_blocking(move || recorder.record(&record))
            .await
            .map_err(|e| TelemetryError::Write {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?
    }

    /// Force buffered data to disk.
    pub fn flush(&self) -> Result<(), TelemetryError> {
        let mut log = self.log.lock().map_err(|_| TelemetryError::Poisoned)?;
        log.flush()
    }
}

impl std::fmt::Debug for TelemetryRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryRecorder")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
