use std::fmt;

use playgrab_core::TriggerControl;
use thiserror::Error;

/// Fatal engine failure: the session cannot continue.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to launch browser: {0}")]
    Launch(String),
    #[error("{stage} failed: {message}")]
    Protocol {
        stage: ProtocolStage,
        message: String,
    },
}

impl EngineError {
    pub(crate) fn protocol(stage: ProtocolStage, message: impl Into<String>) -> Self {
        Self::Protocol {
            stage,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolStage {
    EnableNetwork,
    Navigate,
    Evaluate,
    Extract,
    Activate,
    Shutdown,
}

impl fmt::Display for ProtocolStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolStage::EnableNetwork => write!(f, "enabling network observation"),
            ProtocolStage::Navigate => write!(f, "navigation"),
            ProtocolStage::Evaluate => write!(f, "script evaluation"),
            ProtocolStage::Extract => write!(f, "control extraction"),
            ProtocolStage::Activate => write!(f, "control activation"),
            ProtocolStage::Shutdown => write!(f, "browser shutdown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct TransferError {
    pub kind: TransferFailure,
    pub message: String,
}

impl TransferError {
    pub(crate) fn new(kind: TransferFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferFailure {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Io,
}

impl fmt::Display for TransferFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferFailure::InvalidUrl => write!(f, "invalid url"),
            TransferFailure::HttpStatus(code) => write!(f, "http status {code}"),
            TransferFailure::Timeout => write!(f, "timeout"),
            TransferFailure::Network => write!(f, "network error"),
            TransferFailure::Io => write!(f, "io error"),
        }
    }
}

/// Progress notifications emitted by the session, one or more per control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ControlsFound { count: usize },
    Planned { control: TriggerControl, filename: String },
    ActivationFailed { control_id: String, message: String },
    /// `sequence` is the request's arrival position among matching requests.
    Captured {
        control_id: String,
        url: String,
        sequence: u64,
    },
    CaptureTimedOut { control_id: String, target_host: String },
    Downloaded { filename: String, bytes: u64 },
    DownloadFailed { url: String, message: String },
}
