//! Configuration data model and validation

use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const MAX_TIMEOUT_MS: u64 = 60_000;
const MAX_RUNS: u32 = 20;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Endpoint probed for round-trip latency
    #[serde(default = "default_ping_url")]
    pub ping_url: String,

    /// Large asset streamed for download throughput
    #[serde(default = "default_download_url")]
    pub download_url: String,

    /// Upper bound on the latency probe
    #[serde(default = "default_ping_timeout_ms")]
    pub ping_timeout_ms: u64,

    /// Absolute abort deadline for the download request
    #[serde(default = "default_download_timeout_ms")]
    pub download_timeout_ms: u64,

    /// Download measurement window; the read is cancelled once it elapses
    #[serde(default = "default_sample_window_ms")]
    pub sample_window_ms: u64,

    /// Number of consecutive runs to perform
    #[serde(default = "default_runs")]
    pub runs: u32,

    /// Location of the persisted key-value store
    #[serde(default)]
    pub history_file: Option<PathBuf>,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ping_url: default_ping_url(),
            download_url: default_download_url(),
            ping_timeout_ms: default_ping_timeout_ms(),
            download_timeout_ms: default_download_timeout_ms(),
            sample_window_ms: default_sample_window_ms(),
            runs: default_runs(),
            history_file: None,
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_millis(self.download_timeout_ms)
    }

    pub fn sample_window(&self) -> Duration {
        Duration::from_millis(self.sample_window_ms)
    }

    /// Resolved storage path: explicit setting, else the per-user data directory
    pub fn history_path(&self) -> PathBuf {
        self.history_file
            .clone()
            .unwrap_or_else(default_history_path)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        validate_http_url("ping URL", &self.ping_url)?;
        validate_http_url("download URL", &self.download_url)?;

        for (name, value) in [
            ("Ping timeout", self.ping_timeout_ms),
            ("Download timeout", self.download_timeout_ms),
            ("Sample window", self.sample_window_ms),
        ] {
            if value == 0 {
                return Err(AppError::config(format!("{} must be greater than 0", name)));
            }
            if value > MAX_TIMEOUT_MS {
                return Err(AppError::config(format!(
                    "{} cannot exceed {} ms",
                    name, MAX_TIMEOUT_MS
                )));
            }
        }

        if self.sample_window_ms > self.download_timeout_ms {
            return Err(AppError::config(format!(
                "Sample window ({} ms) cannot exceed the download timeout ({} ms)",
                self.sample_window_ms, self.download_timeout_ms
            )));
        }

        if self.runs == 0 {
            return Err(AppError::config("Run count must be greater than 0"));
        }

        if self.runs > MAX_RUNS {
            return Err(AppError::config(format!("Run count cannot exceed {}", MAX_RUNS)));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        self.merge_from_lookup(|key| std::env::var(key).ok())
    }

    /// Merge settings from an arbitrary key lookup (the process environment in production)
    pub fn merge_from_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PING_URL") {
            self.ping_url = url.trim().to_string();
        }

        if let Some(url) = lookup("DOWNLOAD_URL") {
            self.download_url = url.trim().to_string();
        }

        if let Some(value) = lookup("PING_TIMEOUT_MS") {
            self.ping_timeout_ms = parse_env("PING_TIMEOUT_MS", &value)?;
        }

        if let Some(value) = lookup("DOWNLOAD_TIMEOUT_MS") {
            self.download_timeout_ms = parse_env("DOWNLOAD_TIMEOUT_MS", &value)?;
        }

        if let Some(value) = lookup("SAMPLE_WINDOW_MS") {
            self.sample_window_ms = parse_env("SAMPLE_WINDOW_MS", &value)?;
        }

        if let Some(value) = lookup("TEST_RUNS") {
            self.runs = parse_env("TEST_RUNS", &value)?;
        }

        if let Some(path) = lookup("SWIFTSPEED_HISTORY_FILE") {
            let path = path.trim();
            if !path.is_empty() {
                self.history_file = Some(PathBuf::from(path));
            }
        }

        if let Some(value) = lookup("ENABLE_COLOR") {
            self.enable_color = parse_env("ENABLE_COLOR", &value)?;
        }

        Ok(())
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))
}

fn validate_http_url(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(AppError::config(format!("The {} cannot be empty", name)));
    }

    let parsed = url::Url::parse(value)
        .map_err(|e| AppError::config(format!("Invalid {} '{}': {}", name, value, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(AppError::config(format!(
            "The {} must use http or https, got '{}'",
            name, scheme
        ))),
    }
}

/// Per-user data location following the XDG base directory layout
pub fn default_history_path() -> PathBuf {
    let data_dir = if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg_data)
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        return PathBuf::from("swiftspeed-storage.json");
    };

    data_dir.join("swiftspeed").join("storage.json")
}

// Default value functions for serde
fn default_ping_url() -> String {
    crate::defaults::DEFAULT_PING_URL.to_string()
}

fn default_download_url() -> String {
    crate::defaults::DEFAULT_DOWNLOAD_URL.to_string()
}

fn default_ping_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_PING_TIMEOUT.as_millis() as u64
}

fn default_download_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_DOWNLOAD_TIMEOUT.as_millis() as u64
}

fn default_sample_window_ms() -> u64 {
    crate::defaults::DEFAULT_SAMPLE_WINDOW.as_millis() as u64
}

fn default_runs() -> u32 {
    crate::defaults::DEFAULT_RUNS
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.download_timeout(), Duration::from_millis(8000));
        assert_eq!(config.sample_window(), Duration::from_millis(5000));
        assert_eq!(config.ping_timeout(), Duration::from_millis(5000));
        assert_eq!(config.runs, 1);
    }

    #[test]
    fn test_empty_url_invalid() {
        let mut config = Config::default();
        config.ping_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_http_url_invalid() {
        let mut config = Config::default();
        config.download_url = "ftp://example.com/big.bin".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_malformed_url_invalid() {
        let mut config = Config::default();
        config.download_url = "not-a-url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_and_excessive_timeouts_invalid() {
        let mut config = Config::default();
        config.ping_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.download_timeout_ms = MAX_TIMEOUT_MS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_window_longer_than_timeout_invalid() {
        let mut config = Config::default();
        config.sample_window_ms = 9000;
        config.download_timeout_ms = 8000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_run_bounds() {
        let mut config = Config::default();
        config.runs = 0;
        assert!(config.validate().is_err());
        config.runs = MAX_RUNS;
        assert!(config.validate().is_ok());
        config.runs = MAX_RUNS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_from_lookup() {
        let mut config = Config::default();
        config
            .merge_from_lookup(lookup_from(&[
                ("PING_URL", " http://localhost:9000/ping "),
                ("DOWNLOAD_TIMEOUT_MS", "6000"),
                ("TEST_RUNS", "3"),
                ("SWIFTSPEED_HISTORY_FILE", "/tmp/ss.json"),
                ("ENABLE_COLOR", "false"),
            ]))
            .unwrap();

        assert_eq!(config.ping_url, "http://localhost:9000/ping");
        assert_eq!(config.download_timeout_ms, 6000);
        assert_eq!(config.runs, 3);
        assert_eq!(config.history_path(), PathBuf::from("/tmp/ss.json"));
        assert!(!config.enable_color);
        assert_eq!(config.download_url, crate::defaults::DEFAULT_DOWNLOAD_URL);
    }

    #[test]
    fn test_merge_rejects_bad_numbers() {
        let mut config = Config::default();
        let err = config
            .merge_from_lookup(lookup_from(&[("TEST_RUNS", "many")]))
            .unwrap_err();
        assert_eq!(err.category(), "CONFIG");
        assert!(err.to_string().contains("TEST_RUNS"));
    }

    #[test]
    fn test_default_history_path_names_app() {
        let path = default_history_path();
        assert!(path.to_string_lossy().contains("swiftspeed"));
    }

    #[test]
    fn test_serde_defaults() {
        let config: Config = serde_json::from_str(r#"{"runs": 2}"#).unwrap();
        assert_eq!(config.runs, 2);
        assert_eq!(config.ping_url, crate::defaults::DEFAULT_PING_URL);
        assert!(config.enable_color);
    }
}
