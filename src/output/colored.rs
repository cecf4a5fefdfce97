//! Colored formatter implementation with terminal color support
//!
//! This module provides a rich colored output formatter that uses
//! ANSI colors and Unicode symbols for enhanced visual presentation.

use super::formatter::{
    format_when, gauge, history_rows, history_table_format, FormattingOptions, OutputFormatter,
    PlainFormatter,
};
use crate::{
    error::{AppError, Result},
    models::{SpeedResult, TestState},
    storage::History,
    types::TestStatus,
};
use colored::*;
use std::fmt::Write as _;

/// Performance level classification for color coding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceLevel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl PerformanceLevel {
    /// Classify a round-trip time in milliseconds
    pub fn from_ping(ping_ms: f64) -> Self {
        if ping_ms < 20.0 {
            Self::Excellent
        } else if ping_ms < 50.0 {
            Self::Good
        } else if ping_ms < 100.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// Classify a throughput in Mbps
    pub fn from_throughput(mbps: f64) -> Self {
        if mbps >= 100.0 {
            Self::Excellent
        } else if mbps >= 25.0 {
            Self::Good
        } else if mbps >= 5.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// Get color for this performance level
    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Red,
        }
    }

    /// Get Unicode symbol for this performance level
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Excellent => "🚀",
            Self::Good => "⚡",
            Self::Fair => "🔶",
            Self::Poor => "🐢",
        }
    }

    /// Get descriptive text
    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub muted: Color,
    pub border: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Cyan,
            muted: Color::BrightBlack,
            border: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    plain_formatter: PlainFormatter,
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self::with_color_scheme(options, ColorScheme::default())
    }

    /// Create a colored formatter with custom color scheme
    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        let plain_formatter = PlainFormatter::new(options.clone());
        Self {
            plain_formatter,
            options,
            color_scheme,
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    /// Apply bold formatting if colors are enabled
    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    /// Bold header color, or plain text
    fn heading(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold().color(self.color_scheme.header)
        } else {
            text.normal()
        }
    }

    fn status_badge(&self, status: TestStatus) -> ColoredString {
        let color = match status {
            TestStatus::Idle => self.color_scheme.muted,
            TestStatus::Running => self.color_scheme.info,
            TestStatus::Completed => self.color_scheme.success,
            TestStatus::Error => self.color_scheme.error,
        };
        self.colorize(status.as_str(), color)
    }

    fn ping_colored(&self, ping: f64) -> ColoredString {
        let level = PerformanceLevel::from_ping(ping);
        self.colorize(&format!("{:.0} ms", ping), level.color())
    }

    fn speed_colored(&self, mbps: f64) -> ColoredString {
        let level = PerformanceLevel::from_throughput(mbps);
        self.colorize(&format!("{:.1} Mbps", mbps), level.color())
    }

    /// Create a colored section header
    fn create_section_header(&self, title: &str, icon: &str) -> String {
        format!("{} {}", icon, self.heading(title))
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();

        let decorated_title = format!("📶 {}", title);
        let border = "═".repeat(decorated_title.chars().count() + 4);

        writeln!(output, "{}", self.colorize(&border, self.color_scheme.border))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        writeln!(output, "  {}  ", self.heading(&decorated_title))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        write!(output, "{}", self.colorize(&border, self.color_scheme.border))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;

        Ok(output)
    }

    fn format_state(&self, state: &TestState) -> Result<String> {
        let mut output = String::new();

        write!(
            output,
            "{} 🏓 {} ms  ⬇️  {} Mbps  ⬆️  {} Mbps",
            self.status_badge(state.status),
            self.bold(&gauge(state.current_ping, 0)),
            self.bold(&gauge(state.current_download, 1)),
            self.bold(&gauge(state.current_upload, 1)),
        )
        .map_err(|e| AppError::io(format!("Failed to format state: {}", e)))?;

        if state.status == TestStatus::Error {
            if let Some(ref error) = state.error {
                write!(output, "  {}", self.colorize(error, self.color_scheme.error))
                    .map_err(|e| AppError::io(format!("Failed to format state: {}", e)))?;
            }
        }

        Ok(output)
    }

    fn format_result(&self, result: &SpeedResult) -> Result<String> {
        let mut output = String::new();
        let rows = [
            ("🏓 Ping:    ", self.ping_colored(result.ping), PerformanceLevel::from_ping(result.ping)),
            (
                "⬇️  Download:",
                self.speed_colored(result.download_speed),
                PerformanceLevel::from_throughput(result.download_speed),
            ),
            (
                "⬆️  Upload:  ",
                self.speed_colored(result.upload_speed),
                PerformanceLevel::from_throughput(result.upload_speed),
            ),
        ];

        for (idx, (label, value, level)) in rows.iter().enumerate() {
            if idx > 0 {
                output.push('\n');
            }
            write!(
                output,
                "{} {:>12}  {} {}",
                label,
                value,
                level.symbol(),
                self.colorize(level.description(), level.color())
            )
            .map_err(|e| AppError::io(format!("Failed to format result: {}", e)))?;
        }

        if self.options.verbose_mode {
            write!(
                output,
                "\n{}",
                self.colorize(&format!("Recorded {} ({})", format_when(result), result.id), self.color_scheme.muted)
            )
            .map_err(|e| AppError::io(format!("Failed to format result: {}", e)))?;
        }

        Ok(output)
    }

    fn format_history(&self, history: &History) -> Result<String> {
        if history.is_empty() {
            return Ok(self.colorize("No results recorded yet.", self.color_scheme.muted).to_string());
        }

        let mut output = String::new();
        writeln!(output, "{}", self.create_section_header("Recent results", "🕘"))
            .map_err(|e| AppError::io(format!("Failed to format history: {}", e)))?;

        // Widths are computed on plain text; color is applied to whole lines
        let table = self
            .plain_formatter
            .create_table(&history_table_format(self.options.table_borders), &history_rows(history));
        for (idx, line) in table.lines().enumerate() {
            let styled = if line.starts_with('+') {
                self.colorize(line, self.color_scheme.border)
            } else if idx == 1 || (!self.options.table_borders && idx == 0) {
                self.bold(line)
            } else {
                line.normal()
            };
            writeln!(output, "{}", styled)
                .map_err(|e| AppError::io(format!("Failed to format history: {}", e)))?;
        }

        if let Some(summary) = history.summary() {
            write!(
                output,
                "📊 Average of {}: {} | ⬇️  {} | ⬆️  {} | best {}",
                summary.count,
                self.ping_colored(summary.avg_ping),
                self.speed_colored(summary.avg_download),
                self.speed_colored(summary.avg_upload),
                self.speed_colored(summary.best_download),
            )
            .map_err(|e| AppError::io(format!("Failed to format history: {}", e)))?;
        }

        Ok(output)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("❌ {}", self.colorize(error, self.color_scheme.error)))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("⚠️  {}", self.colorize(warning, self.color_scheme.warning)))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("✅ {}", self.colorize(message, self.color_scheme.success)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatter() -> ColoredFormatter {
        // Colors off keeps assertions independent of the terminal
        ColoredFormatter::new(FormattingOptions {
            enable_color: false,
            ..FormattingOptions::default()
        })
    }

    #[test]
    fn test_ping_levels() {
        assert_eq!(PerformanceLevel::from_ping(8.0), PerformanceLevel::Excellent);
        assert_eq!(PerformanceLevel::from_ping(35.0), PerformanceLevel::Good);
        assert_eq!(PerformanceLevel::from_ping(80.0), PerformanceLevel::Fair);
        assert_eq!(PerformanceLevel::from_ping(250.0), PerformanceLevel::Poor);
    }

    #[test]
    fn test_throughput_levels() {
        assert_eq!(PerformanceLevel::from_throughput(250.0), PerformanceLevel::Excellent);
        assert_eq!(PerformanceLevel::from_throughput(40.0), PerformanceLevel::Good);
        assert_eq!(PerformanceLevel::from_throughput(22.0), PerformanceLevel::Fair);
        assert_eq!(PerformanceLevel::from_throughput(0.1), PerformanceLevel::Poor);
    }

    #[test]
    fn test_level_presentation() {
        assert_eq!(PerformanceLevel::Excellent.color(), Color::Green);
        assert_eq!(PerformanceLevel::Poor.description(), "Poor");
        assert!(!PerformanceLevel::Good.symbol().is_empty());
    }

    #[test]
    fn test_state_line() {
        let mut state = TestState::running();
        state.current_ping = Some(12.0);
        state.current_download = Some(40.0);

        let line = formatter().format_state(&state).unwrap();
        assert!(line.starts_with("RUNNING"));
        assert!(line.contains("12 ms"));
        assert!(line.contains("40.0 Mbps"));
    }

    #[test]
    fn test_result_lines() {
        let result = SpeedResult::new(40.0, 21.5, 12.0);
        let output = formatter().format_result(&result).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("12 ms") && lines[0].contains("Excellent"));
        assert!(lines[1].contains("40.0 Mbps") && lines[1].contains("Good"));
        assert!(lines[2].contains("21.5 Mbps") && lines[2].contains("Fair"));
    }

    #[test]
    fn test_history_output() {
        let mut history = History::new();
        history.push(SpeedResult::new(40.0, 21.5, 12.0));
        let output = formatter().format_history(&history).unwrap();
        assert!(output.contains("Recent results"));
        assert!(output.contains("Download (Mbps)"));
        assert!(output.contains("Average of 1"));

        let empty = formatter().format_history(&History::new()).unwrap();
        assert_eq!(empty, "No results recorded yet.");
    }

    #[test]
    fn test_messages_keep_text() {
        let f = formatter();
        assert!(f.format_error("boom").unwrap().ends_with("boom"));
        assert!(f.format_warning("careful").unwrap().ends_with("careful"));
        assert!(f.format_success("done").unwrap().ends_with("done"));
    }
}
