//! Main application orchestration and execution

use crate::{
    cli::Cli,
    config::{display_config_summary, load_config, validate_config, EnvManager},
    engine::{MeasurementEngine, NetworkEngine},
    error::{AppError, ErrorContext, Result},
    logging::{init_logging, LogOptions},
    models::{Config, SpeedResult},
    output::{JsonOutput, OutputFormatter, OutputFormatterFactory},
    session::{SessionController, TriggerOutcome},
    storage::{FileStore, KeyValueStore},
};
use std::io::{IsTerminal, Write};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// What this invocation was asked to do, beyond the configuration itself
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actions {
    pub show_history: bool,
    pub clear_history: bool,
    pub env_example: bool,
    pub json: bool,
    pub run_tests: bool,
}

impl Actions {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            show_history: cli.show_history,
            clear_history: cli.clear_history,
            env_example: cli.env_example,
            json: cli.json,
            run_tests: cli.runs_tests(),
        }
    }
}

/// Main application struct that coordinates all components
pub struct App {
    config: Config,
    actions: Actions,
    session: SessionController,
    formatter: Box<dyn OutputFormatter>,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Result<Self> {
        let actions = Actions::from_cli(&cli);
        let config = load_config(cli)?;

        if !config.enable_color {
            colored::control::set_override(false);
        }

        // A second initialisation (tests, embedding) is not worth failing over
        let _ = init_logging(&LogOptions::from_config(&config));

        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.history_path()));
        let engine: Arc<dyn MeasurementEngine> =
            Arc::new(NetworkEngine::new(&config).context("Failed to initialise the network engine")?);

        Ok(Self::with_parts(config, actions, engine, store))
    }

    /// Assemble an application from pre-built parts
    pub fn with_parts(
        config: Config,
        actions: Actions,
        engine: Arc<dyn MeasurementEngine>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let formatter = OutputFormatterFactory::create_formatter(config.enable_color, config.verbose);
        let session = SessionController::new(engine, store);

        Self {
            config,
            actions,
            session,
            formatter,
        }
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    /// Run the application
    pub async fn run(self) -> Result<()> {
        if self.actions.env_example {
            print!("{}", EnvManager::create_example_env_content());
            return Ok(());
        }

        if self.config.debug {
            eprintln!("{} v{} (built {})", crate::PKG_NAME, crate::VERSION, crate::BUILD_TIME);
            if let Some(commit) = crate::GIT_COMMIT {
                eprintln!("Commit: {}", commit);
            }
            eprintln!("\nConfiguration Summary:\n{}\n", display_config_summary(&self.config));
        }

        if self.actions.clear_history {
            self.session.clear_history()?;
            if !self.actions.json {
                println!("{}", self.formatter.format_success("History cleared")?);
            }
        }

        if self.actions.show_history {
            self.print_history()?;
            return Ok(());
        }

        if !self.actions.run_tests {
            return Ok(());
        }

        for warning in validate_config(&self.config)? {
            eprintln!("{}", warning.format(self.config.enable_color));
        }

        if !self.actions.json {
            println!("{}\n", self.formatter.format_header(&format!("SwiftSpeed v{}", crate::VERSION))?);
        }

        let results = self.execute().await?;

        if self.actions.json {
            println!("{}", JsonOutput::results(&results)?);
        } else if self.config.runs > 1 {
            println!();
            self.print_history()?;
        }

        Ok(())
    }

    /// Perform the configured number of runs; any failed run fails the whole batch
    pub async fn execute(&self) -> Result<Vec<SpeedResult>> {
        let mut results = Vec::new();
        let mut failures = 0;

        for run in 1..=self.config.runs {
            if self.config.runs > 1 && !self.actions.json {
                println!("Run {}/{}", run, self.config.runs);
            }

            let renderer = self.spawn_renderer();
            let outcome = self.session.trigger().await;
            if let Some(handle) = renderer {
                let _ = handle.await;
                println!();
            }

            match outcome {
                TriggerOutcome::Completed(result) => {
                    if !self.actions.json {
                        println!("{}\n", self.formatter.format_result(&result)?);
                    }
                    results.push(result);
                }
                TriggerOutcome::Failed(e) => {
                    tracing::debug!(run, error = %e, "run failed");
                    failures += 1;
                    let message = self.session.state().error.unwrap_or_else(|| e.to_string());
                    eprintln!("{}", self.formatter.format_error(&message)?);
                }
                TriggerOutcome::AlreadyRunning => {
                    return Err(AppError::internal("a run was already in progress"));
                }
            }
        }

        if failures > 0 {
            return Err(AppError::test_execution(format!(
                "{} of {} runs failed",
                failures, self.config.runs
            )));
        }

        Ok(results)
    }

    fn print_history(&self) -> Result<()> {
        let history = self.session.history();
        if self.actions.json {
            println!("{}", JsonOutput::history(&history)?);
        } else {
            println!("{}", self.formatter.format_history(&history)?);
        }
        Ok(())
    }

    /// Live gauge line, redrawn in place while a run is in progress
    fn spawn_renderer(&self) -> Option<JoinHandle<()>> {
        if self.actions.json || !std::io::stdout().is_terminal() {
            return None;
        }

        let mut rx = self.session.subscribe();
        let formatter = OutputFormatterFactory::create_formatter(self.config.enable_color, false);

        Some(tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let state = rx.borrow_and_update().clone();
                if let Ok(line) = formatter.format_state(&state) {
                    let mut stdout = std::io::stdout();
                    let _ = write!(stdout, "\r\x1b[2K{}", line);
                    let _ = stdout.flush();
                }
                if !state.is_running() {
                    break;
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::ProgressObserver,
        storage::{History, MemoryStore},
        types::TestStatus,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct StubEngine {
        calls: AtomicU32,
        fail_on: Option<u32>,
    }

    #[async_trait]
    impl MeasurementEngine for StubEngine {
        async fn measure_ping(&self) -> Result<f64> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if Some(call) == self.fail_on {
                return Err(AppError::network("offline"));
            }
            Ok(9.0)
        }

        async fn measure_download(&self, progress: &dyn ProgressObserver) -> Result<f64> {
            progress.on_progress(10.0);
            Ok(48.2)
        }

        async fn measure_upload(&self, progress: &dyn ProgressObserver) -> Result<f64> {
            progress.on_progress(5.0);
            Ok(21.7)
        }
    }

    fn app(runs: u32, fail_on: Option<u32>) -> (App, Arc<MemoryStore>) {
        let config = Config {
            runs,
            enable_color: false,
            ..Config::default()
        };
        let actions = Actions {
            json: true,
            run_tests: true,
            ..Actions::default()
        };
        let store = Arc::new(MemoryStore::new());
        let engine = Arc::new(StubEngine { calls: AtomicU32::new(0), fail_on });
        (App::with_parts(config, actions, engine, store.clone()), store)
    }

    #[tokio::test]
    async fn test_execute_runs_configured_count() {
        let (app, store) = app(3, None);
        let results = app.execute().await.unwrap();

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.download_speed == 48.2 && r.ping == 9.0));
        assert_eq!(History::load(store.as_ref()).len(), 3);
        assert_eq!(app.session().state().status, TestStatus::Completed);
    }

    #[tokio::test]
    async fn test_failed_run_fails_batch() {
        let (app, store) = app(2, Some(1));
        let err = app.execute().await.unwrap_err();

        assert_eq!(err.category(), "TEST");
        assert_eq!(err.exit_code(), 6);
        // The second run still went through and was recorded
        assert_eq!(History::load(store.as_ref()).len(), 1);
    }

    #[test]
    fn test_actions_from_cli() {
        use clap::Parser;
        let cli = Cli::parse_from(["swiftspeed", "--show-history", "--json"]);
        let actions = Actions::from_cli(&cli);
        assert!(actions.show_history);
        assert!(actions.json);
        assert!(!actions.run_tests);
    }
}
