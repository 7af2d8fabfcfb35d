//! Model binding value object

use serde::{Deserialize, Serialize};

/// A backend model a conversation is bound to (Value Object)
///
/// `id` is the provider routing key (e.g. `openai/gpt-5.1`), `name` the
/// human-readable label shown in transcripts and rankings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelBinding {
    pub id: String,
    pub name: String,
}

impl ModelBinding {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// The active models loaded on first run
    pub fn default_active_models() -> Vec<ModelBinding> {
        vec![
            ModelBinding::new("openai/gpt-5.1", "GPT-5.1"),
            ModelBinding::new("x-ai/grok-4-fast", "Grok 4 Fast"),
            ModelBinding::new("google/gemini-2.5-pro", "Gemini 2.5 Pro"),
            ModelBinding::new("anthropic/claude-sonnet-4.5", "Claude Sonnet 4.5"),
        ]
    }

    /// Models offered for the orchestrator (agent) role
    pub fn agent_models() -> Vec<ModelBinding> {
        vec![
            ModelBinding::new("google/gemini-2.5-flash", "Gemini 2.5 Flash"),
            ModelBinding::new("x-ai/grok-4-fast", "Grok 4 Fast"),
            ModelBinding::new("openai/gpt-5-mini", "GPT-5 Mini"),
            ModelBinding::new("anthropic/claude-haiku-4.5", "Claude Haiku 4.5"),
        ]
    }

    /// Default orchestrator model id
    pub fn default_agent_model() -> &'static str {
        "x-ai/grok-4-fast"
    }

    /// Provider family derived from the id, used for color coding
    pub fn provider(&self) -> Option<&'static str> {
        let id = self.id.to_lowercase();
        if id.contains("openai") || id.contains("gpt") {
            Some("openai")
        } else if id.contains("anthropic") || id.contains("claude") {
            Some("anthropic")
        } else if id.contains("google") || id.contains("gemini") {
            Some("google")
        } else if id.contains("x-ai") || id.contains("grok") {
            Some("xai")
        } else if id.contains("meta") || id.contains("llama") {
            Some("meta")
        } else {
            None
        }
    }

    /// Short display name for narrow badges
    pub fn short_name(&self) -> String {
        let name = self
            .name
            .replace("Claude ", "")
            .replace("GPT-", "GPT")
            .replace("Gemini ", "Gem ")
            .replace("Grok ", "Grok")
            .replace(" Pro", "")
            .replace(" Flash", " F")
            .replace(" Thinking", " T");
        if name.chars().count() > 12 {
            let head: String = name.chars().take(10).collect();
            format!("{}..", head)
        } else {
            name
        }
    }
}

impl std::fmt::Display for ModelBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

impl std::str::FromStr for ModelBinding {
    type Err = std::convert::Infallible;

    /// Parses `id` or `id=Display Name`; a bare id doubles as its name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.split_once('=') {
            Some((id, name)) => ModelBinding::new(id.trim(), name.trim()),
            None => ModelBinding::new(s.trim(), s.trim()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_name() {
        let model: ModelBinding = "openai/gpt-5.1=GPT-5.1".parse().unwrap();
        assert_eq!(model, ModelBinding::new("openai/gpt-5.1", "GPT-5.1"));
    }

    #[test]
    fn test_parse_bare_id() {
        let model: ModelBinding = "custom/model".parse().unwrap();
        assert_eq!(model.name, "custom/model");
    }

    #[test]
    fn test_provider_detection() {
        assert_eq!(
            ModelBinding::new("anthropic/claude-sonnet-4.5", "Claude").provider(),
            Some("anthropic")
        );
        assert_eq!(
            ModelBinding::new("x-ai/grok-4-fast", "Grok").provider(),
            Some("xai")
        );
        assert_eq!(ModelBinding::new("mistral/large", "Mistral").provider(), None);
    }

    #[test]
    fn test_short_name() {
        assert_eq!(
            ModelBinding::new("a", "Claude Sonnet 4.5").short_name(),
            "Sonnet 4.5"
        );
        assert_eq!(ModelBinding::new("g", "Gemini 2.5 Pro").short_name(), "Gem 2.5");
        assert_eq!(
            ModelBinding::new("x", "Some Very Long Model Name").short_name(),
            "Some Very .."
        );
    }
}
