//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod logging;
mod models;
mod output;
mod provider;
mod repl;
mod session;

pub use logging::FileLoggingConfig;
pub use models::{FileModelEntry, FileModelsConfig};
pub use output::FileOutputConfig;
pub use provider::{DEFAULT_BASE_URL, FileProviderConfig};
pub use repl::FileReplConfig;
pub use session::{FileSessionConfig, expand_home};

use agentic_application::ChatParams;
use agentic_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Chat completions endpoint and credentials
    pub provider: FileProviderConfig,
    /// First-run active models and the agent model
    pub models: FileModelsConfig,
    /// Session storage and auto-save
    pub session: FileSessionConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// REPL settings
    pub repl: FileReplConfig,
    /// Transcript and diagnostics files
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let base_url = self.provider.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidBaseUrl,
                format!("provider.base_url: '{}' is not an http(s) URL", base_url),
            ));
        }
        if self.provider.timeout_seconds == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "provider.timeout_seconds cannot be 0",
            ));
        }

        issues.extend(self.models.parse_active().1);
        issues.extend(self.models.parse_agent().1);

        if self.session.autosave_ms == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::AutosaveDisabled,
                "session.autosave_ms is 0: every change is written immediately",
            ));
        }

        issues
    }

    /// Use case parameters derived from this configuration
    pub fn chat_params(&self) -> ChatParams {
        ChatParams::default()
            .with_autosave_delay(self.session.autosave_delay())
            .with_agent_history_limit(self.repl.agent_history_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentic_domain::OutputFormat;
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[provider]
base_url = "http://localhost:8080/v1"
api_key_env = "MY_KEY"
timeout_seconds = 30

[models]
agent = "openai/gpt-5-mini"

[[models.active]]
id = "openai/gpt-5.1"
name = "GPT-5.1"

[[models.active]]
id = "meta/llama-4"

[session]
data_dir = "/tmp/agentic"
autosave_ms = 250

[output]
format = "synthesis"
color = false

[repl]
show_progress = false
history_file = "~/.local/share/agentic-chat/history.txt"

[logging]
file_log = true
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider.base_url, "http://localhost:8080/v1");
        assert_eq!(config.provider.api_key_env, "MY_KEY");
        assert_eq!(config.provider.title, "Agentic Chat");
        assert_eq!(config.models.agent, "openai/gpt-5-mini");
        let (active, _) = config.models.parse_active();
        assert_eq!(active[1].name, "llama-4");
        assert_eq!(config.session.autosave_ms, 250);
        assert_eq!(config.output.format, Some(OutputFormat::Synthesis));
        assert!(!config.output.color);
        assert!(!config.repl.show_progress);
        assert!(config.logging.file_log);
        assert!(config.logging.conversation_log);
        assert!(config.validate().is_empty());

        let params = config.chat_params();
        assert_eq!(params.autosave_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.models.active.len(), 4);
        assert!(config.output.color);
        assert!(config.repl.show_progress);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let mut config = FileConfig::default();
        config.provider.base_url = "openrouter.ai".to_string();
        config.provider.timeout_seconds = 0;
        config.session.autosave_ms = 0;
        config.models.active.clear();

        let issues = config.validate();
        let codes: Vec<ConfigIssueCode> = issues.iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![
                ConfigIssueCode::InvalidBaseUrl,
                ConfigIssueCode::ZeroTimeout,
                ConfigIssueCode::NoActiveModels,
                ConfigIssueCode::AutosaveDisabled,
            ]
        );
        assert_eq!(issues.iter().filter(|i| i.is_error()).count(), 2);
    }
}
