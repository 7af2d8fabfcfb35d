//! REPL configuration from TOML (`[repl]` section)

use serde::{Deserialize, Serialize};

/// Raw REPL configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Show council progress bars
    pub show_progress: bool,
    /// Path to the line-editor history file
    pub history_file: Option<String>,
    /// Agent chat messages sent to the orchestrator with each request
    pub agent_history_limit: usize,
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
            agent_history_limit: 20,
        }
    }
}
