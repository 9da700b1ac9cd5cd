use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::{TransferError, TransferFailure};

#[derive(Debug, Clone)]
pub struct DownloadSettings {
    pub connect_timeout: Duration,
    /// Longest wait for the response head or for the next body chunk. There
    /// is no cap on the transfer as a whole.
    pub idle_timeout: Duration,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(30),
        }
    }
}

/// Fetches a URL in full and writes it to `destination`, replacing any file there.
///
/// Returns the number of bytes written. A failed transfer may leave a partial
/// file behind.
#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, url: &str, destination: &Path) -> Result<u64, TransferError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestDownloader {
    client: reqwest::Client,
    idle_timeout: Duration,
}

impl ReqwestDownloader {
    pub fn new(settings: DownloadSettings) -> Result<Self, TransferError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| TransferError::new(TransferFailure::Network, err.to_string()))?;
        Ok(Self {
            client,
            idle_timeout: settings.idle_timeout,
        })
    }
}

#[async_trait::async_trait]
impl Downloader for ReqwestDownloader {
    async fn download(&self, url: &str, destination: &Path) -> Result<u64, TransferError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| TransferError::new(TransferFailure::InvalidUrl, err.to_string()))?;

        let response = tokio::time::timeout(self.idle_timeout, self.client.get(parsed).send())
            .await
            .map_err(|_| idle_timeout_error("response head"))?
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::new(
                TransferFailure::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let mut file = tokio::fs::File::create(destination)
            .await
            .map_err(map_io_error)?;
        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        loop {
            let next = tokio::time::timeout(self.idle_timeout, stream.next())
                .await
                .map_err(|_| idle_timeout_error("body"))?;
            let Some(chunk) = next else { break };
            let chunk = chunk.map_err(map_reqwest_error)?;
            file.write_all(&chunk).await.map_err(map_io_error)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(map_io_error)?;

        Ok(written)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransferError {
    if err.is_timeout() {
        return TransferError::new(TransferFailure::Timeout, err.to_string());
    }
    TransferError::new(TransferFailure::Network, err.to_string())
}

fn idle_timeout_error(waiting_for: &str) -> TransferError {
    TransferError::new(
        TransferFailure::Timeout,
        format!("no progress while waiting for {waiting_for}"),
    )
}

fn map_io_error(err: std::io::Error) -> TransferError {
    TransferError::new(TransferFailure::Io, err.to_string())
}
