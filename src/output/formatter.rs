//! Core formatting traits and implementations
//!
//! This module defines the output formatting interface and provides
//! a plain text implementation with table formatting capabilities.

use crate::{
    error::{AppError, Result},
    models::{SpeedResult, TestState},
    storage::History,
    types::TestStatus,
};
use chrono::Local;
use std::fmt::Write as _;

/// Main trait for output formatting
pub trait OutputFormatter: Send + Sync {
    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// Single-line live view of a run in progress
    fn format_state(&self, state: &TestState) -> Result<String>;

    /// Final figures of one completed run
    fn format_result(&self, result: &SpeedResult) -> Result<String>;

    /// Stored results, newest first, with averages
    fn format_history(&self, history: &History) -> Result<String>;

    /// Format error messages
    fn format_error(&self, error: &str) -> Result<String>;

    /// Format warning messages
    fn format_warning(&self, warning: &str) -> Result<String>;

    /// Format success messages
    fn format_success(&self, message: &str) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Enable verbose mode with detailed information
    pub verbose_mode: bool,
    /// Show table borders
    pub table_borders: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            table_borders: true,
        }
    }
}

/// Table formatting configuration
#[derive(Debug, Clone)]
pub struct TableFormat {
    /// Column definitions
    pub columns: Vec<Column>,
    /// Show borders around table
    pub show_borders: bool,
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    pub alignment: Alignment,
    pub min_width: usize,
}

impl Column {
    pub fn new(header: &str, alignment: Alignment, min_width: usize) -> Self {
        Self {
            header: header.to_string(),
            alignment,
            min_width,
        }
    }
}

/// Text alignment options
#[derive(Debug, Clone, Copy)]
pub enum Alignment {
    Left,
    Right,
}

/// Row data for table formatting
pub type RowData = Vec<String>;

/// Columns of the history table
pub(crate) fn history_table_format(show_borders: bool) -> TableFormat {
    TableFormat {
        columns: vec![
            Column::new("#", Alignment::Right, 1),
            Column::new("When", Alignment::Left, 16),
            Column::new("Ping (ms)", Alignment::Right, 9),
            Column::new("Download (Mbps)", Alignment::Right, 15),
            Column::new("Upload (Mbps)", Alignment::Right, 13),
        ],
        show_borders,
    }
}

pub(crate) fn history_rows(history: &History) -> Vec<RowData> {
    history
        .iter()
        .enumerate()
        .map(|(idx, result)| {
            vec![
                (idx + 1).to_string(),
                format_when(result),
                format!("{:.0}", result.ping),
                format!("{:.1}", result.download_speed),
                format!("{:.1}", result.upload_speed),
            ]
        })
        .collect()
}

/// Local completion time of a result
pub(crate) fn format_when(result: &SpeedResult) -> String {
    result
        .recorded_at()
        .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Gauge value, or a placeholder when nothing was measured yet
pub(crate) fn gauge(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "--".to_string(),
    }
}

fn fmt_err(what: &str) -> impl Fn(std::fmt::Error) -> AppError + '_ {
    move |e| AppError::io(format!("Failed to format {}: {}", what, e))
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    /// Create a new plain formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    /// Create a table with the given format and data
    pub(crate) fn create_table(&self, format: &TableFormat, rows: &[RowData]) -> String {
        if rows.is_empty() {
            return String::new();
        }

        let column_widths = self.calculate_column_widths(format, rows);
        let mut output = String::new();

        if format.show_borders {
            output.push_str(&self.create_horizontal_border(&column_widths));
            output.push('\n');
        }

        let headers: Vec<String> = format.columns.iter().map(|c| c.header.clone()).collect();
        output.push_str(&self.create_row(&headers, &column_widths, format));
        output.push('\n');

        if format.show_borders {
            output.push_str(&self.create_horizontal_border(&column_widths));
            output.push('\n');
        }

        for row in rows {
            output.push_str(&self.create_row(row, &column_widths, format));
            output.push('\n');
        }

        if format.show_borders {
            output.push_str(&self.create_horizontal_border(&column_widths));
        }

        output
    }

    /// Calculate optimal column widths
    fn calculate_column_widths(&self, format: &TableFormat, rows: &[RowData]) -> Vec<usize> {
        format
            .columns
            .iter()
            .enumerate()
            .map(|(col_idx, column)| {
                rows.iter()
                    .filter_map(|row| row.get(col_idx))
                    .map(|cell| cell.chars().count())
                    .fold(column.min_width.max(column.header.len()), usize::max)
            })
            .collect()
    }

    /// Create a table row
    fn create_row(&self, data: &[String], widths: &[usize], format: &TableFormat) -> String {
        let mut row = String::new();

        if format.show_borders {
            row.push('|');
        }

        for (idx, (cell, &width)) in data.iter().zip(widths.iter()).enumerate() {
            let alignment = format.columns.get(idx).map(|c| c.alignment).unwrap_or(Alignment::Left);
            let padded_cell = align_text(cell, width, alignment);

            if format.show_borders {
                row.push(' ');
                row.push_str(&padded_cell);
                row.push_str(" |");
            } else {
                row.push_str(&padded_cell);
                row.push_str("  ");
            }
        }

        row.trim_end().to_string()
    }

    /// Create horizontal border for table
    fn create_horizontal_border(&self, widths: &[usize]) -> String {
        let mut border = String::from("+");
        for &width in widths {
            border.push_str(&"-".repeat(width + 2));
            border.push('+');
        }
        border
    }
}

/// Align text within specified width
pub(crate) fn align_text(text: &str, width: usize, alignment: Alignment) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }

    let padding = " ".repeat(width - len);
    match alignment {
        Alignment::Left => format!("{}{}", text, padding),
        Alignment::Right => format!("{}{}", padding, text),
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(title.len() + 4);

        writeln!(output, "{}", border).map_err(fmt_err("header"))?;
        writeln!(output, "  {}  ", title).map_err(fmt_err("header"))?;
        write!(output, "{}", border).map_err(fmt_err("header"))?;

        Ok(output)
    }

    fn format_state(&self, state: &TestState) -> Result<String> {
        let mut output = String::new();

        write!(
            output,
            "[{}] ping {} ms | download {} Mbps | upload {} Mbps",
            state.status,
            gauge(state.current_ping, 0),
            gauge(state.current_download, 1),
            gauge(state.current_upload, 1),
        )
        .map_err(fmt_err("state"))?;

        if state.status == TestStatus::Error {
            if let Some(ref error) = state.error {
                write!(output, " | {}", error).map_err(fmt_err("state"))?;
            }
        }

        Ok(output)
    }

    fn format_result(&self, result: &SpeedResult) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "Ping:      {:.0} ms", result.ping).map_err(fmt_err("result"))?;
        writeln!(output, "Download:  {:.1} Mbps", result.download_speed).map_err(fmt_err("result"))?;
        write!(output, "Upload:    {:.1} Mbps", result.upload_speed).map_err(fmt_err("result"))?;

        if self.options.verbose_mode {
            write!(output, "\nRecorded:  {} ({})", format_when(result), result.id).map_err(fmt_err("result"))?;
        }

        Ok(output)
    }

    fn format_history(&self, history: &History) -> Result<String> {
        if history.is_empty() {
            return Ok("No results recorded yet.".to_string());
        }

        let mut output = String::new();
        writeln!(output, "Recent results (newest first):").map_err(fmt_err("history"))?;
        output.push_str(&self.create_table(
            &history_table_format(self.options.table_borders),
            &history_rows(history),
        ));

        if let Some(summary) = history.summary() {
            write!(
                output,
                "\nAverage of {}: ping {:.0} ms, download {:.1} Mbps, upload {:.1} Mbps (best download {:.1} Mbps)",
                summary.count, summary.avg_ping, summary.avg_download, summary.avg_upload, summary.best_download
            )
            .map_err(fmt_err("history"))?;
        }

        Ok(output)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("ERROR: {}", error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("WARNING: {}", warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("SUCCESS: {}", message))
    }
}
