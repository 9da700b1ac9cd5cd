use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::SessionEvent;

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: SessionEvent);
}

/// Renders session events as the console ledger.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: SessionEvent) {
        match event {
            SessionEvent::ControlsFound { count } => {
                engine_info!("Found {} play controls", count);
            }
            SessionEvent::Planned { control, filename } => {
                engine_info!(
                    "Will download to: {} (aria-label: {:?}, control {})",
                    filename,
                    control.label,
                    control.id
                );
            }
            SessionEvent::ActivationFailed {
                control_id,
                message,
            } => {
                engine_warn!("Error clicking {}: {}", control_id, message);
            }
            SessionEvent::Captured {
                control_id,
                url,
                sequence,
            } => {
                engine_debug!("control {} captured request #{}: {}", control_id, sequence, url);
            }
            SessionEvent::CaptureTimedOut {
                control_id,
                target_host,
            } => {
                engine_warn!(
                    "Timeout waiting for {} request for control {}",
                    target_host,
                    control_id
                );
            }
            SessionEvent::Downloaded { filename, bytes } => {
                engine_info!("Downloaded {} ({} bytes)", filename, bytes);
            }
            SessionEvent::DownloadFailed { url, message } => {
                engine_warn!("Download error for {}: {}", url, message);
            }
        }
    }
}
