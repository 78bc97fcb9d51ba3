//! Size-bounded rotating log file.
//!
//! Generations are named after the active file: `download.log.1` is the most
//! recent rotation, `download.log.<backups>` the oldest one kept.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::TelemetryError;

/// Append-only file that rotates once it would reach `max_bytes`.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    file: File,
    size: u64,
}

impl RotatingFile {
    /// Open (or create) the active file, appending to existing content.
    pub fn open(
        path: impl Into<PathBuf>,
        max_bytes: u64,
        backups: usize,
    ) -> Result<Self, TelemetryError> {
        let path = path.into();
        let file = open_append(&path)?;
        let size = file
            .metadata()
            .map(|m| m.len())
            .map_err(|e| TelemetryError::Open {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            path,
            max_bytes,
            backups,
            file,
            size,
        })
    }

    /// Current size of the active file in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Append one record followed by a newline, rotating first if needed.
    pub fn write_line(&mut self, line: &str) -> Result<(), TelemetryError> {
        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');

        if self.should_rotate(buf.len() as u64) {
            self.rotate()?;
        }

        self.file
            .write_all(&buf)
            .and_then(|_| self.file.flush())
            .map_err(|e| TelemetryError::Write {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        self.size += buf.len() as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), TelemetryError> {
        self.file.sync_data().map_err(|e| TelemetryError::Write {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// A record is never split: an empty file always accepts it.
    fn should_rotate(&self, incoming: u64) -> bool {
        self.size > 0 && self.size + incoming >= self.max_bytes
    }

    /// Move the active file to `.1`, shifting older generations up, and reopen.
    ///
    /// Shifting stops at the first free generation; the oldest is dropped
    /// only when every slot is taken.
    fn rotate(&mut self) -> Result<(), TelemetryError> {
        let rotate_err = |e: std::io::Error| TelemetryError::Rotate {
            path: self.path.display().to_string(),
            message: e.to_string(),
        };

        let free = (1..=self.backups).find(|&n| !generation(&self.path, n).exists());
        let last = match free {
            Some(n) => n,
            None => {
                remove_if_exists(&generation(&self.path, self.backups)).map_err(rotate_err)?;
                self.backups
            }
        };
        for n in (1..last).rev() {
            fs::rename(generation(&self.path, n), generation(&self.path, n + 1))
                .map_err(rotate_err)?;
        }
        fs::rename(&self.path, generation(&self.path, 1)).map_err(rotate_err)?;

        self.file = open_append(&self.path)?;
        self.size = 0;
        Ok(())
    }
}

/// Path of the `n`-th rotated generation of `path`.
pub fn generation(path: &Path, n: usize) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(format!(".{}", n));
    PathBuf::from(name)
}

fn open_append(path: &Path) -> Result<File, TelemetryError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| TelemetryError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
