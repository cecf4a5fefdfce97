//! Output formatting and display system
//!
//! This module provides a flexible output formatting system for test results,
//! supporting both colored and plain text output with table formatting, plus
//! machine-readable JSON.

mod formatter;
mod colored;

pub use formatter::{
    OutputFormatter,
    PlainFormatter,
    TableFormat,
    FormattingOptions,
    Column,
    Alignment,
    RowData,
};
pub use colored::{
    ColoredFormatter,
    ColorScheme,
    PerformanceLevel,
};

use crate::{
    error::Result,
    models::SpeedResult,
    storage::History,
};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            table_borders: true,
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Create a plain text formatter for scripts/logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(false, true)
    }
}

/// JSON rendering for `--json`
pub struct JsonOutput;

impl JsonOutput {
    /// Results of the runs just performed
    pub fn results(results: &[SpeedResult]) -> Result<String> {
        Ok(serde_json::to_string_pretty(results)?)
    }

    /// Stored history, newest first, with the aggregate figures
    pub fn history(history: &History) -> Result<String> {
        let value = serde_json::json!({
            "results": history.entries(),
            "summary": history.summary(),
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_plain_formatter_has_no_ansi() {
        let formatter = OutputFormatterFactory::create_plain_formatter();
        let output = formatter.format_success("ok").unwrap();
        assert_eq!(output, "SUCCESS: ok");
    }

    #[test]
    fn test_json_results() {
        let result = SpeedResult::new(40.0, 21.5, 12.0);
        let json = JsonOutput::results(std::slice::from_ref(&result)).unwrap();
        let parsed: Vec<SpeedResult> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![result]);
        assert!(json.contains("\"downloadSpeed\""));
    }

    #[test]
    fn test_json_history() {
        let mut history = History::new();
        history.push(SpeedResult::new(40.0, 21.5, 12.0));

        let json = JsonOutput::history(&history).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["results"].as_array().unwrap().len(), 1);
        assert_eq!(value["summary"]["count"], 1);

        let empty: serde_json::Value = serde_json::from_str(&JsonOutput::history(&History::new()).unwrap()).unwrap();
        assert!(empty["summary"].is_null());
    }
}
