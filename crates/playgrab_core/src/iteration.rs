//! Per-control trigger/capture/correlate state machine.
//!
//! The machine is pure: the engine feeds it [`Signal`]s describing what just
//! happened and executes the [`Effect`]s it returns. An iteration is finished
//! once `apply` returns no effects and the phase is terminal.

use std::path::PathBuf;

use crate::{synthesize_filename, CaptureStatus, DownloadOutcome, OutcomeError, TriggerControl};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Triggered,
    AwaitingCapture,
    Captured,
    /// The window closed with nothing captured; always followed by `Skipped`.
    TimedOut,
    Downloaded,
    /// Terminal for activation failures, capture timeouts and transfer errors.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Start processing the control.
    Begin,
    /// The synthetic click was delivered.
    Activated,
    /// The click could not be delivered (element gone, script error).
    ActivationFailed(String),
    /// The post-click settle delay elapsed.
    Settled,
    /// One URL was dequeued inside the correlation window.
    RequestCaptured(String),
    /// The correlation window elapsed with nothing dequeued.
    WindowElapsed,
    /// The engine acknowledged a [`Effect::Skip`].
    Skipped,
    DownloadSucceeded(PathBuf),
    DownloadFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Activate { control_id: String },
    Settle,
    AwaitCapture,
    Download { url: String, filename: String },
    /// Give up on the control without a transfer.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iteration {
    control: TriggerControl,
    filename: String,
    phase: Phase,
    url: Option<String>,
    status: CaptureStatus,
    result: Option<Result<PathBuf, OutcomeError>>,
}

impl Iteration {
    pub fn new(control: TriggerControl) -> Self {
        let filename = synthesize_filename(&control.label);
        Self {
            control,
            filename,
            phase: Phase::Idle,
            url: None,
            status: CaptureStatus::NotActivated,
            result: None,
        }
    }

    pub fn control(&self) -> &TriggerControl {
        &self.control
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Downloaded | Phase::Skipped)
    }

    /// Applies a signal and returns the effects to run next.
    ///
    /// A signal that does not fit the current phase is ignored.
    pub fn apply(&mut self, signal: Signal) -> Vec<Effect> {
        match (self.phase, signal) {
            (Phase::Idle, Signal::Begin) => vec![Effect::Activate {
                control_id: self.control.id.clone(),
            }],
            (Phase::Idle, Signal::Activated) => {
                self.phase = Phase::Triggered;
                vec![Effect::Settle]
            }
            (Phase::Idle, Signal::ActivationFailed(message)) => {
                self.skip(OutcomeError::Activation(message));
                Vec::new()
            }
            (Phase::Triggered, Signal::Settled) => {
                self.phase = Phase::AwaitingCapture;
                vec![Effect::AwaitCapture]
            }
            (Phase::AwaitingCapture, Signal::RequestCaptured(url)) => {
                self.phase = Phase::Captured;
                self.status = CaptureStatus::Captured;
                self.url = Some(url.clone());
                vec![Effect::Download {
                    url,
                    filename: self.filename.clone(),
                }]
            }
            (Phase::AwaitingCapture, Signal::WindowElapsed) => {
                self.phase = Phase::TimedOut;
                self.status = CaptureStatus::TimedOut;
                vec![Effect::Skip]
            }
            (Phase::TimedOut, Signal::Skipped) => {
                self.skip(OutcomeError::CaptureTimeout);
                Vec::new()
            }
            (Phase::Captured, Signal::DownloadSucceeded(path)) => {
                self.phase = Phase::Downloaded;
                self.result = Some(Ok(path));
                Vec::new()
            }
            (Phase::Captured, Signal::DownloadFailed(message)) => {
                self.skip(OutcomeError::Transfer(message));
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// The ledger entry, once the iteration has reached a terminal phase.
    pub fn into_outcome(self) -> Option<DownloadOutcome> {
        let result = self.result?;
        Some(DownloadOutcome {
            control: self.control,
            filename: self.filename,
            url: self.url,
            status: self.status,
            result,
        })
    }

    fn skip(&mut self, error: OutcomeError) {
        self.phase = Phase::Skipped;
        self.result = Some(Err(error));
    }
}
