//! Playgrab core: pure types, filename synthesis and the per-control state machine.
mod control;
mod filename;
mod iteration;
mod outcome;

pub use control::TriggerControl;
pub use filename::{synthesize_filename, synthesize_stem, MEDIA_EXTENSION};
pub use iteration::{Effect, Iteration, Phase, Signal};
pub use outcome::{CaptureStatus, DownloadOutcome, OutcomeError};
