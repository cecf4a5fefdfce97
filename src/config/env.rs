//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file from the current directory if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load a specific env file if it exists; a missing file is not an error
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Supported environment variables with descriptions
    pub fn supported_variables() -> &'static [(&'static str, &'static str)] {
        &[
            ("PING_URL", "Endpoint probed for round-trip latency"),
            ("DOWNLOAD_URL", "Large asset streamed for download throughput"),
            ("PING_TIMEOUT_MS", "Latency probe timeout in milliseconds"),
            ("DOWNLOAD_TIMEOUT_MS", "Absolute download abort deadline in milliseconds"),
            ("SAMPLE_WINDOW_MS", "Download measurement window in milliseconds"),
            ("TEST_RUNS", "Number of consecutive test runs"),
            ("SWIFTSPEED_HISTORY_FILE", "Path of the persisted history store"),
            ("ENABLE_COLOR", "Enable colored output (true/false)"),
        ]
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        let mut content = String::from(
            "# SwiftSpeed Configuration\n\
             #\n\
             # Values here are used as defaults and can be overridden by\n\
             # command-line arguments.\n",
        );

        for (key, description) in Self::supported_variables() {
            content.push_str(&format!("\n# {}\n# {}=\n", description, key));
        }

        content.push_str(
            "\n# Example: a local test server\n\
             # PING_URL=http://192.168.1.10:8080/ping\n\
             # DOWNLOAD_URL=http://192.168.1.10:8080/100MB.bin\n",
        );
        content
    }
}
