//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Session lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestStatus {
    /// No run has been started yet
    #[default]
    Idle,
    /// A run is in progress
    Running,
    /// The last run finished and produced a result
    Completed,
    /// The last run failed
    Error,
}

impl TestStatus {
    /// Whether a new run may be started from this status
    pub fn can_start(&self) -> bool {
        !matches!(self, TestStatus::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Idle => "IDLE",
            TestStatus::Running => "RUNNING",
            TestStatus::Completed => "COMPLETED",
            TestStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a throughput measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedKind {
    Download,
    Upload,
}

impl SpeedKind {
    /// Steady-state target of the synthetic curve for this direction, in Mbps
    pub fn base_target(&self) -> f64 {
        match self {
            SpeedKind::Download => crate::defaults::DOWNLOAD_FALLBACK_TARGET_MBPS,
            SpeedKind::Upload => crate::defaults::UPLOAD_TARGET_MBPS,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SpeedKind::Download => "download",
            SpeedKind::Upload => "upload",
        }
    }
}

impl fmt::Display for SpeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rounds to one decimal place, the precision every reported speed uses
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Throughput in megabits per second for `bytes` transferred over `seconds`
pub fn mbps(bytes: u64, seconds: f64) -> f64 {
    (bytes as f64 * 8.0) / (seconds * 1_000_000.0)
}
