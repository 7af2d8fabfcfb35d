//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Append transcript events to `<data_dir>/conversations.jsonl`
    pub conversation_log: bool,
    /// Write diagnostics to a daily rolling file under `<data_dir>/logs`
    pub file_log: bool,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            conversation_log: true,
            file_log: false,
        }
    }
}
