//! Telemetry record format.

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One line of the telemetry log.
///
/// Serialized as a single JSON object tagged by `event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryRecord {
    /// An archive was generated and returned
    ZipGenerated {
        /// RFC 3339 UTC timestamp
        timestamp: String,
        client_ip: String,
        files_count: usize,
        zip_size_bytes: usize,
        matricules_found: Vec<String>,
        /// Wall-clock generation time, rounded to 2 decimals
        duration_seconds: f64,
    },

    /// Generation failed
    ZipError {
        timestamp: String,
        client_ip: String,
        error: String,
    },
}

impl TelemetryRecord {
    pub fn success(
        client_ip: impl Into<String>,
        files_count: usize,
        zip_size_bytes: usize,
        matricules_found: Vec<String>,
        duration: Duration,
    ) -> Self {
        TelemetryRecord::ZipGenerated {
            timestamp: now(),
            client_ip: client_ip.into(),
            files_count,
            zip_size_bytes,
            matricules_found,
            duration_seconds: round_seconds(duration),
        }
    }

    pub fn failure(client_ip: impl Into<String>, error: impl Into<String>) -> Self {
        TelemetryRecord::ZipError {
            timestamp: now(),
            client_ip: client_ip.into(),
            error: error.into(),
        }
    }

    /// Serialize to one JSON line, without the trailing newline.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Seconds rounded to two decimals.
pub fn round_seconds(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 100.0).round() / 100.0
}
