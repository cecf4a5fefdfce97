//! Advisory configuration checks
//!
//! Hard errors live in [`Config::validate`]; this module adds warnings for
//! settings that are legal but likely to skew the measurements.

use crate::{error::Result, models::Config};

/// Configuration validator producing advisory warnings
pub struct ConfigValidator;

impl ConfigValidator {
    /// Run the hard validation, then collect warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::check_endpoint("Ping", &config.ping_url));
        warnings.extend(Self::check_endpoint("Download", &config.download_url));
        warnings.extend(Self::check_timing(config));

        if config.runs as usize > crate::defaults::HISTORY_CAPACITY {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "{} runs requested but only the last {} results are kept in history",
                    config.runs,
                    crate::defaults::HISTORY_CAPACITY
                ),
            ));
        }

        Ok(warnings)
    }

    fn check_endpoint(label: &str, value: &str) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let Ok(parsed) = url::Url::parse(value) else {
            return warnings;
        };

        if parsed.scheme() == "http" {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("{} URL '{}' uses HTTP; intermediate proxies may cache or shape it", label, value),
            ));
        }

        match parsed.host() {
            Some(url::Host::Ipv4(ip)) if ip.is_loopback() || ip.is_private() => {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("{} URL '{}' targets a private/local network", label, value),
                ));
            }
            Some(url::Host::Domain("localhost")) => {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("{} URL '{}' targets localhost", label, value),
                ));
            }
            _ => {}
        }

        if parsed.query_pairs().any(|(key, _)| key == "cb") {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("{} URL '{}' already has a 'cb' parameter; it will be overridden", label, value),
            ));
        }

        warnings
    }

    fn check_timing(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.sample_window_ms < 1000 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "A {} ms sample window is shorter than TCP warm-up; download estimates will read low",
                    config.sample_window_ms
                ),
            ));
        }

        if config.ping_timeout_ms < 100 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "A {} ms ping timeout will usually expire and fall back to an estimate",
                    config.ping_timeout_ms
                ),
            ));
        }

        warnings
    }
}

/// Severity of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationLevel::Info => "INFO",
            ValidationLevel::Warning => "WARN",
        }
    }
}

/// A single advisory finding
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        if use_color {
            use colored::Colorize;
            let tag = match self.level {
                ValidationLevel::Info => self.level.as_str().cyan(),
                ValidationLevel::Warning => self.level.as_str().yellow(),
            };
            format!("[{}] {}", tag, self.message)
        } else {
            format!("[{}] {}", self.level.as_str(), self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
