//! Command-line interface

use clap::Parser;
use std::path::PathBuf;

/// SwiftSpeed - measure ping, download and upload speed from the terminal
#[derive(Parser, Debug, Clone)]
#[command(name = "swiftspeed")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Number of consecutive test runs
    #[arg(short = 'n', long, value_parser = parse_runs)]
    pub runs: Option<u32>,

    /// Download abort timeout in milliseconds
    #[arg(short, long, value_name = "MS", value_parser = parse_timeout_ms)]
    pub timeout: Option<u64>,

    /// Endpoint probed for latency
    #[arg(long, value_name = "URL")]
    pub ping_url: Option<String>,

    /// Asset streamed for download throughput
    #[arg(long, value_name = "URL")]
    pub download_url: Option<String>,

    /// Location of the persisted history store
    #[arg(long, value_name = "PATH")]
    pub history_file: Option<PathBuf>,

    /// Print the stored history and exit without testing
    #[arg(long)]
    pub show_history: bool,

    /// Remove all stored results before doing anything else
    #[arg(long)]
    pub clear_history: bool,

    /// Print results as JSON instead of formatted text
    #[arg(long)]
    pub json: bool,

    /// Print an example .env file and exit
    #[arg(long)]
    pub env_example: bool,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if self.show_history && self.runs.is_some() {
            return Err("--show-history does not run tests; drop --runs".to_string());
        }

        Ok(())
    }

    /// Whether this invocation performs measurements
    pub fn runs_tests(&self) -> bool {
        !self.show_history && !self.env_example && !(self.clear_history && self.runs.is_none())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color || self.json {
            false
        } else {
            supports_color()
        }
    }
}

fn parse_runs(s: &str) -> Result<u32, String> {
    s.parse::<u32>()
        .map_err(|_| format!("Invalid run count: {}", s))
        .and_then(|runs| {
            if runs == 0 {
                Err("Run count must be greater than 0".to_string())
            } else if runs > 20 {
                Err("Run count cannot exceed 20".to_string())
            } else {
                Ok(runs)
            }
        })
}

/// Parse a timeout in milliseconds
fn parse_timeout_ms(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid timeout: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid timeout: {}", s))
        .and_then(|ms| {
            if ms == 0 {
                Err("Timeout must be greater than 0".to_string())
            } else if ms > 60_000 {
                Err("Timeout cannot exceed 60000 ms".to_string())
            } else {
                Ok(ms)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
