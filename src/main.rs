//! SwiftSpeed - Main CLI Application
//!
//! Measures ping, download and upload speed and keeps the last five results.

use clap::Parser;
use std::process;
use swiftspeed::{
    app::App,
    cli::Cli,
    error::{AppError, ErrorReporter},
};

#[tokio::main]
async fn main() {
    // Set up better panic handling
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        eprintln!("Please report this issue together with the command you ran.");
        process::exit(99);
    }));

    let cli = Cli::parse();
    let use_color = cli.use_colors();
    let verbose = cli.verbose || cli.debug;

    let result = match App::new(cli) {
        Ok(app) => app.run().await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        ErrorReporter::new(use_color, verbose).report_error(&e);
        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format (see --env-example)");
            eprintln!("  - Verify URL formats (must start with http:// or https://)");
            eprintln!("  - Timeouts are in milliseconds, between 1 and 60000");
        }
        AppError::Storage(_) | AppError::Io(_) => {
            eprintln!();
            eprintln!("History storage help:");
            eprintln!("  - Point --history-file at a writable location");
            eprintln!("  - Remove a damaged file with --clear-history");
        }
        AppError::TestExecution(_) => {
            eprintln!();
            eprintln!("Execution troubleshooting:");
            eprintln!("  - Check your internet connection");
            eprintln!("  - Try again; each run is independent");
        }
        _ => {}
    }
}
