//! Model configuration from TOML (`[models]` section)
//!
//! ```toml
//! [models]
//! agent = "x-ai/grok-4-fast"
//!
//! [[models.active]]
//! id = "openai/gpt-5.1"
//! name = "GPT-5.1"
//! ```

use agentic_domain::{ConfigIssue, ConfigIssueCode, ModelBinding};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One `[[models.active]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileModelEntry {
    pub id: String,
    /// Display name; defaults to the part of the id after the last `/`
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelsConfig {
    /// Models activated on first run
    pub active: Vec<FileModelEntry>,
    /// Orchestrator model used until the user picks one
    pub agent: String,
}

impl Default for FileModelsConfig {
    fn default() -> Self {
        Self {
            active: ModelBinding::default_active_models()
                .into_iter()
                .map(|m| FileModelEntry {
                    id: m.id,
                    name: Some(m.name),
                })
                .collect(),
            agent: ModelBinding::default_agent_model().to_string(),
        }
    }
}

impl FileModelsConfig {
    /// Active models as bindings. Entries with an empty id are dropped and
    /// reported.
    pub fn parse_active(&self) -> (Vec<ModelBinding>, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();
        let mut bindings = Vec::new();

        for entry in &self.active {
            let id = entry.id.trim();
            if id.is_empty() {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::EmptyModelId,
                    "models.active: entry with an empty id ignored",
                ));
                continue;
            }
            if !seen.insert(id.to_string()) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::DuplicateActiveModel,
                    format!("models.active: '{}' listed more than once", id),
                ));
                continue;
            }
            let binding = match &entry.name {
                Some(name) if !name.trim().is_empty() => ModelBinding::new(id, name.trim()),
                _ => ModelBinding::new(id, id.rsplit('/').next().unwrap_or(id)),
            };
            bindings.push(binding);
        }

        if bindings.is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::NoActiveModels,
                "models.active is empty: add a model before creating conversations",
            ));
        }
        (bindings, issues)
    }

    /// Agent model id, falling back to the built-in default
    pub fn parse_agent(&self) -> (String, Vec<ConfigIssue>) {
        if self.agent.trim().is_empty() {
            (
                ModelBinding::default_agent_model().to_string(),
                vec![ConfigIssue::warning(
                    ConfigIssueCode::EmptyModelId,
                    format!(
                        "models.agent is empty, using '{}'",
                        ModelBinding::default_agent_model()
                    ),
                )],
            )
        } else {
            (self.agent.trim().to_string(), Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_built_in_models() {
        let (bindings, issues) = FileModelsConfig::default().parse_active();
        assert_eq!(bindings, ModelBinding::default_active_models());
        assert!(issues.is_empty());
    }

    #[test]
    fn test_parse_active_reports_bad_entries() {
        let config: FileModelsConfig = toml::from_str(
            r#"
agent = ""

[[active]]
id = "openai/gpt-5.1"

[[active]]
id = ""

[[active]]
id = "openai/gpt-5.1"
name = "again"
"#,
        )
        .unwrap();

        let (bindings, issues) = config.parse_active();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].id, "openai/gpt-5.1");
        let codes: Vec<ConfigIssueCode> = issues.iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![ConfigIssueCode::EmptyModelId, ConfigIssueCode::DuplicateActiveModel]
        );

        let (agent, issues) = config.parse_agent();
        assert_eq!(agent, "x-ai/grok-4-fast");
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_empty_active_list() {
        let config = FileModelsConfig {
            active: Vec::new(),
            ..Default::default()
        };
        let (bindings, issues) = config.parse_active();
        assert!(bindings.is_empty());
        assert_eq!(issues[0].code, ConfigIssueCode::NoActiveModels);
    }
}
