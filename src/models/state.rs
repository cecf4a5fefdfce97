//! Live session state observed by the view layer

use crate::types::TestStatus;
use serde::{Deserialize, Serialize};

/// Transient state of the current (or last) run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestState {
    pub status: TestStatus,
    pub current_download: Option<f64>,
    pub current_upload: Option<f64>,
    pub current_ping: Option<f64>,
    pub error: Option<String>,
    /// Set once the ping of the current run resolved; purely informational
    #[serde(default)]
    pub ping_success: bool,
}

impl TestState {
    /// State at the beginning of a run: metrics zeroed, error cleared
    pub fn running() -> Self {
        Self {
            status: TestStatus::Running,
            current_download: Some(0.0),
            current_upload: Some(0.0),
            current_ping: Some(0.0),
            error: None,
            ping_success: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == TestStatus::Running
    }

    /// Finalize with the measured speeds
    pub fn complete(&mut self, download: f64, upload: f64) {
        self.status = TestStatus::Completed;
        self.current_download = Some(download);
        self.current_upload = Some(upload);
    }

    /// Finalize as failed, keeping whatever metrics were already shown
    pub fn fail<S: Into<String>>(&mut self, message: S) {
        self.status = TestStatus::Error;
        self.error = Some(message.into());
    }
}
