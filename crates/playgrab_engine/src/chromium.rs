use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::network::{EnableParams, EventRequestWillBeSent};
use chromiumoxide::{Browser, BrowserConfig, Page};
use engine_logging::{engine_debug, engine_info};
use futures_util::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::{
    activation_script, ControlMarker, EngineError, PageDriver, ProtocolStage, RequestStream,
};

#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub headless: bool,
    /// Chrome/Chromium binary; auto-detected when `None`.
    pub executable: Option<PathBuf>,
    pub no_sandbox: bool,
    /// Upper bound for a single CDP request.
    pub request_timeout: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            no_sandbox: false,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// [`PageDriver`] backed by a locally launched Chromium over CDP.
pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl ChromiumDriver {
    /// Launches the browser, starts its event handler and opens a blank page.
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, EngineError> {
        let mut builder = BrowserConfig::builder().request_timeout(settings.request_timeout);
        if !settings.headless {
            builder = builder.with_head();
        }
        if settings.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(executable) = &settings.executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(EngineError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| EngineError::Launch(err.to_string()))?;

        // The handler drives every CDP message; it must be polled for the
        // browser's whole lifetime.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    engine_debug!("browser handler: {}", err);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(err) => {
                handler_task.abort();
                return Err(EngineError::Launch(err.to_string()));
            }
        };
        engine_info!("Browser launched");

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    /// Closes the browser and stops the handler task.
    pub async fn shutdown(mut self) -> Result<(), EngineError> {
        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|err| EngineError::protocol(ProtocolStage::Shutdown, err.to_string()));
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        closed
    }
}

#[async_trait::async_trait]
impl PageDriver for ChromiumDriver {
    async fn observe_requests(&self) -> Result<RequestStream, EngineError> {
        // Listen before enabling so no early request slips past.
        let events = self
            .page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(|err| EngineError::protocol(ProtocolStage::EnableNetwork, err.to_string()))?;
        self.page
            .execute(EnableParams::default())
            .await
            .map_err(|err| EngineError::protocol(ProtocolStage::EnableNetwork, err.to_string()))?;

        Ok(events.map(|event| event.request.url.clone()).boxed())
    }

    async fn navigate(&self, url: &str) -> Result<(), EngineError> {
        self.page
            .goto(url)
            .await
            .map_err(|err| EngineError::protocol(ProtocolStage::Navigate, err.to_string()))?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value, EngineError> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|err| EngineError::protocol(ProtocolStage::Evaluate, err.to_string()))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn activate(&self, marker: &ControlMarker) -> Result<(), EngineError> {
        let clicked = self
            .page
            .evaluate(activation_script(marker).as_str())
            .await
            .map_err(|err| EngineError::protocol(ProtocolStage::Activate, err.to_string()))?;
        match clicked.value().and_then(Value::as_bool) {
            Some(true) => Ok(()),
            _ => Err(EngineError::protocol(
                ProtocolStage::Activate,
                format!("no element matches {}", marker.selector()),
            )),
        }
    }
}
