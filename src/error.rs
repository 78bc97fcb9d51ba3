use thiserror::Error;

/// Reasons a client-supplied matricule is refused before any file access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatriculeError {
    /// Empty or whitespace-only matricule
    #[error("matricule is empty")]
    Empty,

    /// Contains a parent-directory marker (`..`)
    #[error("matricule contains a parent-directory marker: {0:?}")]
    ParentDirectory(String),

    /// Contains a path separator (`/` or `\`)
    #[error("matricule contains a path separator: {0:?}")]
    PathSeparator(String),
}

/// I/O errors raised by an image store
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A file reported as present could not be read
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    /// The auxiliary document directory exists but could not be listed
    #[error("Failed to list {path}: {message}")]
    List { path: String, message: String },
}

/// Errors that abort the generation of an archive.
///
/// Any of these means no archive is returned for the request.
#[derive(Debug, Clone, Error)]
pub enum ArchiveError {
    /// Reading a source file failed after it was resolved
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The ZIP writer failed
    #[error("Zip error: {0}")]
    Zip(String),

    /// The blocking archive worker did not complete
    #[error("Archive worker failed: {0}")]
    Worker(String),
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        ArchiveError::Zip(err.to_string())
    }
}

/// Errors from the telemetry log
#[derive(Debug, Clone, Error)]
pub enum TelemetryError {
    /// The active log file could not be opened
    #[error("Failed to open telemetry log {path}: {message}")]
    Open { path: String, message: String },

    /// Appending a record failed
    #[error("Failed to write telemetry log {path}: {message}")]
    Write { path: String, message: String },

    /// Shifting generations failed
    #[error("Failed to rotate telemetry log {path}: {message}")]
    Rotate { path: String, message: String },

    /// The record could not be serialized
    #[error("Failed to serialize telemetry record: {0}")]
    Serialize(String),

    /// A writer panicked while holding the log
    #[error("Telemetry log lock poisoned")]
    Poisoned,
}
