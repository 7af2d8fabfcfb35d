//! HTTP transport for OpenRouter-compatible chat completions.

use super::sse::SseDecoder;
use super::wire::{ChatRequest, ChatResponse, error_message};
use agentic_application::{
    CompletionOptions, GatewayError, ModelTransport, StreamEvent, StreamHandle,
};
use agentic_domain::WireMessage;
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::RwLock;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Connection settings, usually taken from the `[provider]` config section
#[derive(Debug, Clone)]
pub struct OpenRouterSettings {
    pub base_url: String,
    pub referer: String,
    pub title: String,
    pub timeout: Duration,
}

impl Default for OpenRouterSettings {
    fn default() -> Self {
        Self {
            base_url: crate::config::DEFAULT_BASE_URL.to_string(),
            referer: "https://github.com/agentic-chat/agentic-chat".to_string(),
            title: "Agentic Chat".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// [`ModelTransport`] over `POST {base_url}/chat/completions`
pub struct OpenRouterTransport {
    client: reqwest::Client,
    settings: OpenRouterSettings,
    api_key: RwLock<Option<String>>,
}

impl OpenRouterTransport {
    pub fn new(settings: OpenRouterSettings, api_key: Option<String>) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        info!("OpenRouter transport targeting {}", settings.base_url);
        Ok(Self {
            client,
            settings,
            api_key: RwLock::new(api_key.filter(|k| !k.trim().is_empty())),
        })
    }

    /// Replace the API key (after `login`)
    pub fn set_api_key(&self, key: Option<String>) {
        if let Ok(mut slot) = self.api_key.write() {
            *slot = key.filter(|k| !k.trim().is_empty());
        }
    }

    fn api_key(&self) -> Result<String, GatewayError> {
        self.api_key
            .read()
            .ok()
            .and_then(|k| k.clone())
            .ok_or(GatewayError::MissingCredentials)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    async fn post(
        &self,
        model_id: &str,
        messages: &[WireMessage],
        options: &CompletionOptions,
        stream: bool,
    ) -> Result<reqwest::Response, GatewayError> {
        let api_key = self.api_key()?;
        let body = ChatRequest {
            model: model_id,
            messages,
            stream,
            options,
        };

        debug!(
            "POST {} model={} messages={} stream={}",
            self.endpoint(),
            model_id,
            messages.len(),
            stream
        );
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.settings.referer)
            .header("X-Title", &self.settings.title)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(&text)
                .unwrap_or_else(|| format!("API request failed: {}", status.as_u16()));
            warn!("Model {} returned {}: {}", model_id, status.as_u16(), message);
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

fn request_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

#[async_trait]
impl ModelTransport for OpenRouterTransport {
    fn is_configured(&self) -> bool {
        self.api_key().is_ok()
    }

    async fn send_completion(
        &self,
        model_id: &str,
        messages: &[WireMessage],
        options: &CompletionOptions,
    ) -> Result<String, GatewayError> {
        let response = self.post(model_id, messages, options, false).await?;
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        Ok(body.into_content())
    }

    async fn send_streaming(
        &self,
        model_id: &str,
        messages: &[WireMessage],
        options: &CompletionOptions,
    ) -> Result<StreamHandle, GatewayError> {
        let response = self.post(model_id, messages, options, true).await?;
        let (tx, rx) = mpsc::channel(64);
        let model_id = model_id.to_string();

        tokio::spawn(async move {
            let mut decoder = SseDecoder::new();
            let mut bytes = response.bytes_stream();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        warn!("Stream from {} broke off: {}", model_id, e);
                        let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                        return;
                    }
                };
                for delta in decoder.feed(&chunk) {
                    if tx.send(StreamEvent::Delta(delta)).await.is_err() {
                        debug!("Stream receiver for {} dropped", model_id);
                        return;
                    }
                }
                if decoder.is_done() {
                    break;
                }
            }

            if let Some(delta) = decoder.finish() {
                let _ = tx.send(StreamEvent::Delta(delta)).await;
            }
            let _ = tx.send(StreamEvent::Completed(String::new())).await;
        });

        Ok(StreamHandle::new(rx))
    }
}
