use std::path::Path;

use anyhow::{Context, Result};
use engine_logging::engine_warn;
use log::Level;
use playgrab_engine::{
    run_session, ChromiumDriver, DownloadSettings, LogProgressSink, ReqwestDownloader,
    SessionReport,
};

use crate::cli::Args;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Completed,
    /// Ctrl-C arrived mid-session; the remaining controls were abandoned.
    Interrupted,
}

pub async fn run(args: Args) -> Result<Exit> {
    let url = args.target_url()?;
    let settings = args.session_settings();
    prepare_output_dir(&settings.output_dir)?;

    let downloader =
        ReqwestDownloader::new(DownloadSettings::default()).context("building HTTP client")?;
    let driver = ChromiumDriver::launch(&args.browser_settings())
        .await
        .context("starting browser")?;

    let sink = LogProgressSink;
    let result = tokio::select! {
        result = run_session(url.as_str(), &driver, &downloader, &sink, &settings) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    if let Err(err) = driver.shutdown().await {
        engine_warn!("{}", err);
    }

    let Some(result) = result else {
        engine_warn!("Interrupted; remaining controls abandoned");
        return Ok(Exit::Interrupted);
    };
    let report = result.with_context(|| format!("session for {url} failed"))?;

    for (level, line) in summary(&report) {
        log::log!(level, "{}", line);
    }
    Ok(Exit::Completed)
}

/// Creates the output directory up front so a bad path fails before the
/// browser starts rather than once per control.
fn prepare_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create output directory {}", dir.display()))
}

/// End-of-run lines. Queue drops are silent at the default level.
fn summary(report: &SessionReport) -> Vec<(Level, String)> {
    let mut lines = vec![(
        Level::Info,
        format!(
            "Finished: {} of {} controls downloaded",
            report.downloaded(),
            report.outcomes.len()
        ),
    )];
    if report.observer.dropped > 0 {
        lines.push((
            Level::Debug,
            format!(
                "pending queue dropped {} matching requests",
                report.observer.dropped
            ),
        ));
    }
    lines
}
