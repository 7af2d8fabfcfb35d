//! Model transport port
//!
//! Defines the interface for sending a message list to a named model.

use agentic_domain::WireMessage;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during model transport operations
///
/// `Display` of [`GatewayError::Api`] is the provider's own message so that
/// transcript error entries carry it verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("API key not configured")]
    MissingCredentials,

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Stream failed: {0}")]
    StreamFailed(String),

    #[error("Timeout")]
    Timeout,
}

/// Per-request options
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompletionOptions {
    /// Ask for a JSON object reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl CompletionOptions {
    pub fn json_object() -> Self {
        Self {
            response_format: Some(ResponseFormat::json_object()),
            ..Self::default()
        }
    }
}

/// OpenAI-style `response_format` object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            kind: "json_object".to_string(),
        }
    }
}

/// An event in a streaming model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text chunk from the model.
    Delta(String),
    /// The complete response text (signals stream end).
    Completed(String),
    /// An error that occurred during streaming.
    Error(String),
}

/// Handle for receiving streaming events.
///
/// Wraps an `mpsc::Receiver<StreamEvent>` and provides convenience methods
/// for consuming the stream.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(self) -> Result<String, GatewayError> {
        self.collect_text_with(|_| {}).await
    }

    /// Consume the stream, handing every delta to `on_delta` in arrival order.
    ///
    /// A `Completed` event with text ends the stream; when no deltas were seen
    /// that text is the result. A closed channel returns what arrived so far.
    pub async fn collect_text_with(
        mut self,
        mut on_delta: impl FnMut(&str) + Send,
    ) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => {
                    on_delta(&chunk);
                    full_text.push_str(&chunk);
                }
                StreamEvent::Completed(text) => {
                    if full_text.is_empty() {
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                StreamEvent::Error(e) => {
                    return Err(GatewayError::StreamFailed(e));
                }
            }
        }
        Ok(full_text)
    }
}

/// Chat-completion transport
///
/// Callers pass role and content only; `source` and timestamps never leave
/// the application. Implementations (adapters) live in the infrastructure
/// layer.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    /// Whether credentials are available. Use cases refuse to start work
    /// when this is false.
    fn is_configured(&self) -> bool {
        true
    }

    /// Send a message list and wait for the full reply
    async fn send_completion(
        &self,
        model_id: &str,
        messages: &[WireMessage],
        options: &CompletionOptions,
    ) -> Result<String, GatewayError>;

    /// Send a message list and stream the reply.
    ///
    /// Default implementation calls `send_completion()` and wraps the result in
    /// a single `Completed` event.
    async fn send_streaming(
        &self,
        model_id: &str,
        messages: &[WireMessage],
        options: &CompletionOptions,
    ) -> Result<StreamHandle, GatewayError> {
        let result = self.send_completion(model_id, messages, options).await?;
        let (tx, rx) = mpsc::channel(1);
        let _ = tx.send(StreamEvent::Completed(result)).await;
        Ok(StreamHandle::new(rx))
    }
}
