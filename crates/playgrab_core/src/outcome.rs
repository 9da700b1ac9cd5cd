use std::path::PathBuf;

use thiserror::Error;

use crate::TriggerControl;

/// How the capture step of an iteration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    /// A queued request URL was taken inside the correlation window.
    Captured,
    /// The window elapsed with the queue empty.
    TimedOut,
    /// The control could not be activated, so no capture was attempted.
    NotActivated,
}

/// Per-control failure that is recovered locally; the session moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutcomeError {
    #[error("activation failed: {0}")]
    Activation(String),
    #[error("no matching request within the capture window")]
    CaptureTimeout,
    #[error("transfer failed: {0}")]
    Transfer(String),
}

/// Ledger entry for one processed control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub control: TriggerControl,
    pub filename: String,
    pub url: Option<String>,
    pub status: CaptureStatus,
    pub result: Result<PathBuf, OutcomeError>,
}

impl DownloadOutcome {
    pub fn is_downloaded(&self) -> bool {
        self.result.is_ok()
    }
}
