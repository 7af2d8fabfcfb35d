//! Provider configuration from TOML (`[provider]` section)

use crate::openrouter::OpenRouterSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// OpenRouter-compatible chat completions endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,
    /// Environment variable holding the API key (default: "OPENROUTER_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var or `login`).
    pub api_key: Option<String>,
    /// Sent as `HTTP-Referer` for provider attribution.
    pub referer: String,
    /// Sent as `X-Title`.
    pub title: String,
    /// Per-request timeout.
    pub timeout_seconds: u64,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            api_key: None,
            referer: "https://github.com/agentic-chat/agentic-chat".to_string(),
            title: "Agentic Chat".to_string(),
            timeout_seconds: 120,
        }
    }
}

impl FileProviderConfig {
    /// Transport settings for this endpoint
    pub fn settings(&self) -> OpenRouterSettings {
        OpenRouterSettings {
            base_url: self.base_url.trim().to_string(),
            referer: self.referer.clone(),
            title: self.title.clone(),
            timeout: Duration::from_secs(self.timeout_seconds.max(1)),
        }
    }

    /// Pick the API key: the config value, then the env var, then `stored`.
    pub fn resolve_api_key(&self, stored: Option<String>) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                std::env::var(&self.api_key_env)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            })
            .or(stored)
    }
}
