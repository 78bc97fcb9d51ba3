//! Configuration management for the Apercus server.
//!
//! Configuration is read once at startup from:
//! - Command-line arguments via clap
//! - Environment variables with `APERCUS_` prefix
//! - Defaults matching the historical deployment layout
//!
//! # Environment Variables
//!
//! - `APERCUS_HOST` - Server bind address (default: 0.0.0.0)
//! - `APERCUS_PORT` - Server port (default: 5000)
//! - `APERCUS_IMAGES_DIR` - Directory holding `<matricule>.jpg` previews (default: Apercus)
//! - `APERCUS_CGU_DIR` - Directory holding the CGU documents (default: CGU)
//! - `APERCUS_STATIC_DIR` - Directory holding `index.html` (default: .)
//! - `APERCUS_TELEMETRY_LOG` - Telemetry log file (default: download.log)
//! - `APERCUS_TELEMETRY_MAX_BYTES` - Rotation threshold (default: 10 MiB)
//! - `APERCUS_TELEMETRY_BACKUPS` - Rotated generations kept (default: 5)
//! - `APERCUS_CORS_ORIGINS` - Allowed CORS origins, comma-separated (default: any)

use std::path::PathBuf;

use clap::Parser;

use crate::telemetry::{DEFAULT_TELEMETRY_BACKUPS, DEFAULT_TELEMETRY_MAX_BYTES};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default image store directory.
pub const DEFAULT_IMAGES_DIR: &str = "Apercus";

/// Default CGU document directory.
pub const DEFAULT_CGU_DIR: &str = "CGU";

/// Default directory for the front-end entry document.
pub const DEFAULT_STATIC_DIR: &str = ".";

/// Default telemetry log file.
pub const DEFAULT_TELEMETRY_LOG: &str = "download.log";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Apercus server - builds ZIP selections of preview images.
///
/// Resolves each requested matricule to `<images-dir>/<matricule>.jpg`,
/// bundles the matches with the CGU documents and streams back `selection.zip`.
#[derive(Parser, Debug, Clone)]
#[command(name = "apercus-server")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "APERCUS_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "APERCUS_PORT")]
    pub port: u16,

    // =========================================================================
    // Store Configuration
    // =========================================================================
    /// Directory containing the preview images, one `<matricule>.jpg` each.
    #[arg(long, default_value = DEFAULT_IMAGES_DIR, env = "APERCUS_IMAGES_DIR")]
    pub images_dir: PathBuf,

    /// Directory whose files are bundled under `CGU/` in every archive.
    #[arg(long, default_value = DEFAULT_CGU_DIR, env = "APERCUS_CGU_DIR")]
    pub cgu_dir: PathBuf,

    /// Directory containing the front-end `index.html`.
    #[arg(long, default_value = DEFAULT_STATIC_DIR, env = "APERCUS_STATIC_DIR")]
    pub static_dir: PathBuf,

    // =========================================================================
    // Telemetry Configuration
    // =========================================================================
    /// Path of the structured telemetry log.
    #[arg(long, default_value = DEFAULT_TELEMETRY_LOG, env = "APERCUS_TELEMETRY_LOG")]
    pub telemetry_log: PathBuf,

    /// Size in bytes at which the telemetry log is rotated.
    #[arg(long, default_value_t = DEFAULT_TELEMETRY_MAX_BYTES, env = "APERCUS_TELEMETRY_MAX_BYTES")]
    pub telemetry_max_bytes: u64,

    /// Number of rotated telemetry generations to keep.
    #[arg(long, default_value_t = DEFAULT_TELEMETRY_BACKUPS, env = "APERCUS_TELEMETRY_BACKUPS")]
    pub telemetry_backups: usize,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "APERCUS_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.images_dir.as_os_str().is_empty() {
            return Err(
                "Images directory is required. Set --images-dir or APERCUS_IMAGES_DIR".to_string(),
            );
        }

        if self.telemetry_log.as_os_str().is_empty() {
            return Err(
                "Telemetry log path is required. Set --telemetry-log or APERCUS_TELEMETRY_LOG"
                    .to_string(),
            );
        }

        if self.telemetry_max_bytes == 0 {
            return Err("telemetry_max_bytes must be greater than 0".to_string());
        }
        if self.telemetry_backups == 0 {
            return Err("telemetry_backups must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Path of the front-end entry document.
    pub fn index_path(&self) -> PathBuf {
        self.static_dir.join("index.html")
    }
}

// =============================================================================
// Tests
// =============================================================================
