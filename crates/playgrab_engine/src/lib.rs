//! Playgrab engine: browser driving, request capture and downloads.
mod chromium;
mod download;
mod driver;
mod extract;
mod observer;
mod progress;
mod session;
mod types;

pub use chromium::{BrowserSettings, ChromiumDriver};
pub use download::{DownloadSettings, Downloader, ReqwestDownloader};
pub use driver::{ControlMarker, PageDriver, RequestStream};
pub use extract::{
    activation_script, extract_controls, extraction_script, parse_controls, CONTROL_ID_PREFIX,
};
pub use observer::{
    pending_queue, CapturedRequest, NetworkObserver, ObserverStats, PendingQueue, QueueProducer,
};
pub use progress::{LogProgressSink, ProgressSink};
pub use session::{run_session, SessionReport, SessionSettings};
pub use types::{EngineError, ProtocolStage, SessionEvent, TransferError, TransferFailure};
