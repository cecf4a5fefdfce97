//! SwiftSpeed
//!
//! A network speed test that estimates round-trip latency, download
//! throughput and (synthetic) upload throughput, renders live progress in the
//! terminal and keeps the five most recent results on disk.

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod session;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use engine::{MeasurementEngine, NetworkEngine, ProgressObserver, RampGenerator};
pub use error::{AppError, Result};
pub use models::{Config, SpeedResult, TestState};
pub use session::SessionController;
pub use storage::{FileStore, History, KeyValueStore, MemoryStore};
pub use types::{SpeedKind, TestStatus};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
pub const BUILD_TIME: &str = env!("SWIFTSPEED_BUILD_TIME");
pub const GIT_COMMIT: Option<&str> = option_env!("SWIFTSPEED_GIT_COMMIT");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_PING_URL: &str = "https://www.google.com/favicon.ico";
    pub const DEFAULT_DOWNLOAD_URL: &str =
        "https://upload.wikimedia.org/wikipedia/commons/3/3f/Fronalpstock_big.jpg";

    pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_millis(5000);
    pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_millis(8000);
    pub const DEFAULT_SAMPLE_WINDOW: Duration = Duration::from_millis(5000);
    /// No progress is reported before this much of the download has elapsed
    pub const DEFAULT_REPORT_THRESHOLD: Duration = Duration::from_millis(100);

    pub const DEFAULT_RUNS: u32 = 1;
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Fallback ping estimate range, in whole milliseconds (upper bound exclusive)
    pub const FALLBACK_PING_RANGE_MS: std::ops::Range<u64> = 5..20;

    pub const RAMP_WINDOW: Duration = Duration::from_millis(3000);
    pub const RAMP_TICK: Duration = Duration::from_millis(100);
    pub const RAMP_UP: Duration = Duration::from_millis(1000);
    pub const RAMP_JITTER_FRACTION: f64 = 0.05;
    pub const RAMP_MIN_SAMPLE: f64 = 0.1;

    pub const DOWNLOAD_FALLBACK_TARGET_MBPS: f64 = 65.0;
    pub const UPLOAD_TARGET_MBPS: f64 = 22.0;

    pub const HISTORY_CAPACITY: usize = 5;
    pub const HISTORY_STORAGE_KEY: &str = "swiftspeed_results_v1";
    pub const SESSION_ERROR_MESSAGE: &str = "Connection lost. Try again.";
}
