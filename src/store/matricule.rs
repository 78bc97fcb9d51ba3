//! Matricule validation.
//!
//! A matricule names exactly one image in the store. It is accepted verbatim
//! (no trimming, case-folding or length limit) unless it could escape the
//! store directory.

use std::fmt;

use crate::error::MatriculeError;

/// A matricule that passed validation and is safe to join onto a directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Matricule(String);

impl Matricule {
    /// Validate a raw client-supplied identifier.
    ///
    /// Rejects empty or blank strings and anything containing `..`, `/` or
    /// `\`. Nothing else is rejected: NUL bytes or a leading `~` pass through.
    pub fn parse(raw: &str) -> Result<Self, MatriculeError> {
        if raw.trim().is_empty() {
            return Err(MatriculeError::Empty);
        }
        if raw.contains("..") {
            return Err(MatriculeError::ParentDirectory(raw.to_string()));
        }
        if raw.contains('/') || raw.contains('\\') {
            return Err(MatriculeError::PathSeparator(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// The matricule as supplied by the client.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the image file backing this matricule, also used as its
    /// archive entry name.
    pub fn image_filename(&self) -> String {
        format!("{}.{}", self.0, super::IMAGE_EXTENSION)
    }
}

impl fmt::Display for Matricule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate a raw identifier, discarding the parsed value.
pub fn validate(raw: &str) -> Result<(), MatriculeError> {
    Matricule::parse(raw).map(|_| ())
}
