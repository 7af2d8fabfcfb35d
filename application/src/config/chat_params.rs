//! Chat parameters: use case behavior control.
//!
//! [`ChatParams`] groups the static parameters the use cases read. The
//! binary fills them from the loaded config file.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Use case behavior parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatParams {
    /// Quiet period before an auto-save actually writes.
    pub autosave_delay: Duration,
    /// Most recent agent chat messages sent to the orchestrator with each turn.
    pub agent_history_limit: usize,
    /// Ask the orchestrator model for JSON object mode.
    pub json_response_format: bool,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self {
            autosave_delay: Duration::from_millis(1000),
            agent_history_limit: 20,
            json_response_format: true,
        }
    }
}

impl ChatParams {
    pub fn with_autosave_delay(mut self, delay: Duration) -> Self {
        self.autosave_delay = delay;
        self
    }

    pub fn with_agent_history_limit(mut self, limit: usize) -> Self {
        self.agent_history_limit = limit;
        self
    }

    pub fn with_json_response_format(mut self, enabled: bool) -> Self {
        self.json_response_format = enabled;
        self
    }
}
