//! Completed speed test result record

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One completed run, as stored in history.
///
/// Field names serialize in camelCase so stored history stays readable by
/// any tool sharing the same storage key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedResult {
    /// Opaque unique identifier
    pub id: String,
    /// Completion time in epoch milliseconds
    pub timestamp: i64,
    /// Download throughput in Mbps
    pub download_speed: f64,
    /// Upload throughput in Mbps
    pub upload_speed: f64,
    /// Round-trip latency in milliseconds
    pub ping: f64,
}

impl SpeedResult {
    /// Create a result stamped with a fresh id and the current time
    pub fn new(download_speed: f64, upload_speed: f64, ping: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            download_speed,
            upload_speed,
            ping,
        }
    }

    /// Completion time as a UTC datetime
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    /// Whether all metrics are within their valid ranges
    pub fn is_valid(&self) -> bool {
        self.ping >= 0.0
            && self.download_speed >= 0.0
            && self.upload_speed >= 0.0
            && self.ping.is_finite()
            && self.download_speed.is_finite()
            && self.upload_speed.is_finite()
    }
}
