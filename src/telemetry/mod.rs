//! Request telemetry.
//!
//! Every `/download-zip` call that gets past input parsing produces exactly
//! one JSON line in a size-bounded rotating log:
//!
//! ```text
//! {"event":"zip_generated","timestamp":"...","client_ip":"...","files_count":2,
//!  "zip_size_bytes":51234,"matricules_found":["123","456"],"duration_seconds":0.04}
//! {"event":"zip_error","timestamp":"...","client_ip":"...","error":"..."}
//! ```
//!
//! Human-readable progress goes through `tracing` instead; this log is the
//! machine-readable side.

mod record;
mod recorder;
mod rotating;

pub use record::{round_seconds, TelemetryRecord};
pub use recorder::TelemetryRecorder;
pub use rotating::{generation, RotatingFile};

/// Default rotation threshold (10 MiB).
pub const DEFAULT_TELEMETRY_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Default number of rotated generations kept.
pub const DEFAULT_TELEMETRY_BACKUPS: usize = 5;
