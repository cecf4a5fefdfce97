//! Session controller: runs one test at a time and owns the history
//!
//! State is published on a `tokio::sync::watch` channel. A run moves
//! IDLE/COMPLETED/ERROR → RUNNING → COMPLETED or ERROR; triggering while
//! RUNNING changes nothing.

use crate::{
    defaults::SESSION_ERROR_MESSAGE,
    engine::MeasurementEngine,
    error::{AppError, Result},
    models::{SpeedResult, TestState},
    storage::{History, KeyValueStore},
};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

/// What a call to [`SessionController::trigger`] amounted to
#[derive(Debug, Clone)]
pub enum TriggerOutcome {
    /// The run finished and its result was recorded
    Completed(SpeedResult),
    /// The run failed; nothing was recorded
    Failed(AppError),
    /// Another run was in progress, so nothing happened
    AlreadyRunning,
}

impl TriggerOutcome {
    pub fn result(&self) -> Option<&SpeedResult> {
        match self {
            TriggerOutcome::Completed(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TriggerOutcome::Completed(_))
    }
}

pub struct SessionController {
    engine: Arc<dyn MeasurementEngine>,
    store: Arc<dyn KeyValueStore>,
    history: Mutex<History>,
    state: watch::Sender<TestState>,
}

impl SessionController {
    /// Create a controller, loading any stored history (best effort)
    pub fn new(engine: Arc<dyn MeasurementEngine>, store: Arc<dyn KeyValueStore>) -> Self {
        let history = History::load(store.as_ref());
        let (state, _) = watch::channel(TestState::default());

        Self {
            engine,
            store,
            history: Mutex::new(history),
            state,
        }
    }

    /// Follow state changes
    pub fn subscribe(&self) -> watch::Receiver<TestState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> TestState {
        self.state.borrow().clone()
    }

    /// Snapshot of the history, newest first
    pub fn history(&self) -> History {
        self.lock_history().clone()
    }

    /// Drop every stored result and persist the empty list
    pub fn clear_history(&self) -> Result<()> {
        let mut history = self.lock_history();
        history.clear();
        history.save(self.store.as_ref())?;
        tracing::info!("history cleared");
        Ok(())
    }

    /// Run one full test unless one is already in progress
    pub async fn trigger(&self) -> TriggerOutcome {
        let started = self.state.send_if_modified(|state| {
            if !state.status.can_start() {
                return false;
            }
            *state = TestState::running();
            true
        });

        if !started {
            tracing::debug!("trigger ignored, a run is already in progress");
            return TriggerOutcome::AlreadyRunning;
        }
        tracing::info!("run started");

        match self.run().await {
            Ok(result) => {
                self.record(&result);
                self.state
                    .send_modify(|state| state.complete(result.download_speed, result.upload_speed));
                tracing::info!(
                    ping = result.ping,
                    download = result.download_speed,
                    upload = result.upload_speed,
                    "run completed"
                );
                TriggerOutcome::Completed(result)
            }
            Err(e) => {
                tracing::warn!(error = %e, "run failed");
                self.state.send_modify(|state| state.fail(SESSION_ERROR_MESSAGE));
                TriggerOutcome::Failed(e)
            }
        }
    }

    async fn run(&self) -> Result<SpeedResult> {
        let ping = self.engine.measure_ping().await?;
        self.state.send_modify(|state| {
            state.current_ping = Some(ping);
            state.ping_success = true;
        });

        let on_download = |mbps: f64| {
            self.state.send_modify(|state| state.current_download = Some(mbps));
        };
        let on_upload = |mbps: f64| {
            self.state.send_modify(|state| state.current_upload = Some(mbps));
        };

        let (download, upload) = tokio::join!(
            self.engine.measure_download(&on_download),
            self.engine.measure_upload(&on_upload),
        );

        Ok(SpeedResult::new(download?, upload?, ping))
    }

    fn record(&self, result: &SpeedResult) {
        let mut history = self.lock_history();
        history.push(result.clone());
        if let Err(e) = history.save(self.store.as_ref()) {
            tracing::warn!(error = %e, "failed to persist history");
        }
    }

    fn lock_history(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
