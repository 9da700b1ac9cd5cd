//! Command-line arguments for `playgrab`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use engine_logging::LogDestination;
use log::LevelFilter;
use playgrab_engine::{BrowserSettings, SessionSettings};
use url::Url;

/// Click every play control on a page and download the media each one requests.
#[derive(Debug, Parser)]
#[command(name = "playgrab")]
#[command(about = "Download per-track media from a page of play buttons", long_about = None)]
pub struct Args {
    /// Page to visit.
    #[arg(short = 'u', long = "url", value_name = "URL")]
    pub url: String,

    /// Directory the media files are written to (default: current directory).
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Substring a request URL must contain to count as media.
    #[arg(long, value_name = "SUBSTR")]
    pub target_host: Option<String>,

    /// CSS selector for the play controls.
    #[arg(long, value_name = "CSS")]
    pub selector: Option<String>,

    /// Pending request queue size; extra requests are dropped.
    #[arg(long, value_name = "N")]
    pub queue_capacity: Option<usize>,

    /// Wait after navigation before looking for controls.
    #[arg(long, value_name = "MS")]
    pub page_settle_ms: Option<u64>,

    /// Wait after each click before looking for its request.
    #[arg(long, value_name = "MS")]
    pub click_settle_ms: Option<u64>,

    /// How long to wait for a request after the settle delay.
    #[arg(long, value_name = "MS")]
    pub capture_timeout_ms: Option<u64>,

    /// Show the browser window.
    #[arg(long)]
    pub headful: bool,

    /// Path to the Chrome/Chromium binary.
    #[arg(long, value_name = "PATH")]
    pub chrome: Option<PathBuf>,

    /// Launch Chromium with --no-sandbox (containers, root).
    #[arg(long)]
    pub no_sandbox: bool,

    /// Also write the log to this file.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Debug-level logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The page URL; must be an absolute http(s) URL.
    pub fn target_url(&self) -> Result<Url> {
        let raw = self.url.trim();
        if raw.is_empty() {
            bail!("a target page URL is required (-u URL)");
        }
        let url = Url::parse(raw).with_context(|| format!("invalid page URL {raw:?}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("unsupported URL scheme {:?} in {raw:?}", url.scheme());
        }
        Ok(url)
    }

    pub fn session_settings(&self) -> SessionSettings {
        let mut settings = SessionSettings::default();
        if let Some(dir) = &self.out_dir {
            settings.output_dir = dir.clone();
        }
        if let Some(host) = &self.target_host {
            settings.target_host = host.clone();
        }
        if let Some(selector) = &self.selector {
            settings.control_selector = selector.clone();
        }
        if let Some(capacity) = self.queue_capacity {
            settings.queue_capacity = capacity;
        }
        if let Some(ms) = self.page_settle_ms {
            settings.page_settle = Duration::from_millis(ms);
        }
        if let Some(ms) = self.click_settle_ms {
            settings.click_settle = Duration::from_millis(ms);
        }
        if let Some(ms) = self.capture_timeout_ms {
            settings.capture_window = Duration::from_millis(ms);
        }
        settings
    }

    pub fn browser_settings(&self) -> BrowserSettings {
        BrowserSettings {
            headless: !self.headful,
            executable: self.chrome.clone(),
            no_sandbox: self.no_sandbox,
            ..BrowserSettings::default()
        }
    }

    pub fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) => LogDestination::TerminalAndFile(path.clone()),
            None => LogDestination::Terminal,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}
