use futures_util::stream::BoxStream;

use crate::EngineError;

/// URLs of outgoing requests, in the order the page issued them.
pub type RequestStream = BoxStream<'static, String>;

/// Locates a control that the extractor tagged in the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlMarker {
    pub attribute: String,
    pub id: String,
}

impl ControlMarker {
    pub fn new(attribute: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            id: id.into(),
        }
    }

    /// CSS attribute selector matching the tagged element.
    pub fn selector(&self) -> String {
        format!("[{}=\"{}\"]", self.attribute, self.id)
    }
}

/// The slice of a rendering engine the session needs.
#[async_trait::async_trait]
pub trait PageDriver: Send + Sync {
    /// Subscribes to outgoing-request events, then enables network observation.
    ///
    /// Called once per session. The stream stays open until the page goes away.
    async fn observe_requests(&self) -> Result<RequestStream, EngineError>;

    async fn navigate(&self, url: &str) -> Result<(), EngineError>;

    /// Evaluates a script in the page and returns its value as JSON.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, EngineError>;

    /// Delivers a synthetic click to the marked control.
    async fn activate(&self, marker: &ControlMarker) -> Result<(), EngineError>;
}
