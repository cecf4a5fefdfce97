//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::{AppError, Result},
    models::Config,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Defaults, then `.env`, then the environment, then CLI flags; validated last
    pub fn parse(&self) -> Result<Config> {
        self.cli.validate().map_err(AppError::config)?;

        EnvManager::load_env_file(self.cli.debug)?;

        let mut config = Config::default();
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    /// Build a configuration from CLI flags only, ignoring the environment
    pub fn parse_without_env(&self) -> Result<Config> {
        self.cli.validate().map_err(AppError::config)?;

        let mut config = Config::default();
        self.apply_cli_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    fn apply_cli_overrides(&self, config: &mut Config) {
        if let Some(runs) = self.cli.runs {
            config.runs = runs;
        }

        if let Some(timeout) = self.cli.timeout {
            config.download_timeout_ms = timeout;
            // Keep the window inside the abort deadline
            if config.sample_window_ms > timeout {
                config.sample_window_ms = timeout;
            }
        }

        if let Some(ref url) = self.cli.ping_url {
            config.ping_url = url.clone();
        }

        if let Some(ref url) = self.cli.download_url {
            config.download_url = url.clone();
        }

        if let Some(ref path) = self.cli.history_file {
            config.history_file = Some(path.clone());
        }

        if self.cli.no_color || self.cli.json {
            config.enable_color = false;
        } else if self.cli.color {
            config.enable_color = true;
        }

        // CLI-only flags
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let summary = [
        format!("Ping URL: {}", config.ping_url),
        format!("Download URL: {}", config.download_url),
        format!("Ping timeout: {}ms", config.ping_timeout_ms),
        format!("Download timeout: {}ms", config.download_timeout_ms),
        format!("Sample window: {}ms", config.sample_window_ms),
        format!("Runs: {}", config.runs),
        format!("History file: {}", config.history_path().display()),
        format!("Color Output: {}", config.enable_color),
        format!("Verbose: {}", config.verbose),
        format!("Debug: {}", config.debug),
    ];

    summary.join("\n")
}
