//! Session storage configuration from TOML (`[session]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// Where sessions and preferences are stored; `~` is expanded
    pub data_dir: Option<String>,
    /// Auto-save quiet period in milliseconds
    pub autosave_ms: u64,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            autosave_ms: 1000,
        }
    }
}

impl FileSessionConfig {
    /// Resolved data directory, `$XDG_DATA_HOME/agentic-chat` by default
    pub fn data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => expand_home(dir),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("agentic-chat"),
        }
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_ms)
    }
}

/// Expand a leading `~/` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
