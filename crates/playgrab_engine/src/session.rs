//! The trigger/capture/correlate loop.
//!
//! One session navigates, extracts the controls once, then walks them in
//! document order. Each control is clicked, given a settle delay, and then
//! paired with the next request in the pending queue if one shows up within
//! the capture window. Pairing is by arrival order, so a request that arrives
//! late for one control can be attributed to the next.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info};
use playgrab_core::{DownloadOutcome, Effect, Iteration, Signal, TriggerControl};

use crate::{
    extract_controls, ControlMarker, Downloader, EngineError, NetworkObserver, ObserverStats,
    PageDriver, PendingQueue, ProgressSink, SessionEvent,
};

#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Substring identifying media requests (the CDN host).
    pub target_host: String,
    pub control_selector: String,
    pub marker_attribute: String,
    pub queue_capacity: usize,
    /// Wait after navigation before extracting controls.
    pub page_settle: Duration,
    /// Wait after each click before polling the queue.
    pub click_settle: Duration,
    /// Correlation window per control.
    pub capture_window: Duration,
    pub output_dir: PathBuf,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            target_host: "t4.bcbits.com".to_string(),
            control_selector: "div.play_status".to_string(),
            marker_attribute: "data-ccid".to_string(),
            queue_capacity: 100,
            page_settle: Duration::from_secs(2),
            click_settle: Duration::from_secs(1),
            capture_window: Duration::from_secs(2),
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// One entry per extracted control, in processing order.
    pub outcomes: Vec<DownloadOutcome>,
    pub observer: ObserverStats,
}

impl SessionReport {
    pub fn downloaded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_downloaded()).count()
    }
}

/// Runs one full session against `url`.
///
/// Errors are returned only for failures that make the rest of the run
/// meaningless: enabling network observation, navigation and extraction.
/// Per-control failures end up in the report.
pub async fn run_session(
    url: &str,
    driver: &dyn PageDriver,
    downloader: &dyn Downloader,
    sink: &dyn ProgressSink,
    settings: &SessionSettings,
) -> Result<SessionReport, EngineError> {
    let requests = driver.observe_requests().await?;
    let (observer, mut queue) = NetworkObserver::install(
        requests,
        settings.target_host.clone(),
        settings.queue_capacity,
    );

    let mut runner = Runner {
        driver,
        downloader,
        sink,
        settings,
        queue: &mut queue,
    };
    let result = runner.run(url).await;

    let stats = observer.shutdown().await;
    engine_debug!(
        "observer stopped: {} accepted, {} dropped",
        stats.accepted,
        stats.dropped
    );

    Ok(SessionReport {
        outcomes: result?,
        observer: stats,
    })
}

struct Runner<'a> {
    driver: &'a dyn PageDriver,
    downloader: &'a dyn Downloader,
    sink: &'a dyn ProgressSink,
    settings: &'a SessionSettings,
    queue: &'a mut PendingQueue,
}

impl Runner<'_> {
    async fn run(&mut self, url: &str) -> Result<Vec<DownloadOutcome>, EngineError> {
        engine_info!("Navigating to {}", url);
        self.driver.navigate(url).await?;
        tokio::time::sleep(self.settings.page_settle).await;

        let controls = extract_controls(
            self.driver,
            &self.settings.control_selector,
            &self.settings.marker_attribute,
        )
        .await?;
        self.sink.emit(SessionEvent::ControlsFound {
            count: controls.len(),
        });

        let mut outcomes = Vec::with_capacity(controls.len());
        for control in controls {
            let control_id = control.id.clone();
            match self.process(control).await {
                Some(outcome) => outcomes.push(outcome),
                None => engine_error!("control {} stopped before a terminal state", control_id),
            }
        }
        Ok(outcomes)
    }

    async fn process(&mut self, control: TriggerControl) -> Option<DownloadOutcome> {
        let mut iteration = Iteration::new(control);
        self.sink.emit(SessionEvent::Planned {
            control: iteration.control().clone(),
            filename: iteration.filename().to_string(),
        });

        let mut pending: VecDeque<Effect> = iteration.apply(Signal::Begin).into();
        while let Some(effect) = pending.pop_front() {
            let signal = self.execute(iteration.control(), effect).await;
            pending.extend(iteration.apply(signal));
        }
        iteration.into_outcome()
    }

    async fn execute(&mut self, control: &TriggerControl, effect: Effect) -> Signal {
        match effect {
            Effect::Activate { control_id } => {
                let marker = ControlMarker::new(&self.settings.marker_attribute, &control_id);
                match self.driver.activate(&marker).await {
                    Ok(()) => Signal::Activated,
                    Err(err) => {
                        let message = err.to_string();
                        self.sink.emit(SessionEvent::ActivationFailed {
                            control_id,
                            message: message.clone(),
                        });
                        Signal::ActivationFailed(message)
                    }
                }
            }
            Effect::Settle => {
                tokio::time::sleep(self.settings.click_settle).await;
                Signal::Settled
            }
            Effect::AwaitCapture => {
                let window = self.settings.capture_window;
                match self.queue.next_within(window).await {
                    Some(request) => {
                        self.sink.emit(SessionEvent::Captured {
                            control_id: control.id.clone(),
                            url: request.url.clone(),
                            sequence: request.sequence,
                        });
                        Signal::RequestCaptured(request.url)
                    }
                    None => {
                        self.sink.emit(SessionEvent::CaptureTimedOut {
                            control_id: control.id.clone(),
                            target_host: self.settings.target_host.clone(),
                        });
                        Signal::WindowElapsed
                    }
                }
            }
            Effect::Skip => Signal::Skipped,
            Effect::Download { url, filename } => {
                let destination = self.settings.output_dir.join(&filename);
                match self.downloader.download(&url, &destination).await {
                    Ok(bytes) => {
                        self.sink.emit(SessionEvent::Downloaded { filename, bytes });
                        Signal::DownloadSucceeded(destination)
                    }
                    Err(err) => {
                        let message = err.to_string();
                        self.sink.emit(SessionEvent::DownloadFailed {
                            url,
                            message: message.clone(),
                        });
                        Signal::DownloadFailed(message)
                    }
                }
            }
        }
    }
}
