//! Transcript message entity

use crate::council::CouncilResult;
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Who authored a user-role message: the human, or the orchestrator agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSource {
    User,
    Agent,
}

/// A message in a transcript (Entity)
///
/// `timestamp` is milliseconds since the Unix epoch. `source` only appears on
/// user-role messages. `council` is set on the agent-chat message that carries
/// a council run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<MessageSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub council: Option<Box<CouncilResult>>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>, source: Option<MessageSource>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            source,
            council: None,
        }
    }

    pub fn user(content: impl Into<String>, source: MessageSource) -> Self {
        Self::new(Role::User, content, Some(source))
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, None)
    }

    /// Synthetic assistant reply recording a failed model call
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self::assistant(format!("Error: {}", message))
    }

    /// Plain message without a source tag (agent chat entries)
    pub fn plain(role: Role, content: impl Into<String>) -> Self {
        Self::new(role, content, None)
    }

    pub fn with_council(mut self, result: CouncilResult) -> Self {
        self.council = Some(Box::new(result));
        self
    }

    pub fn is_error(&self) -> bool {
        self.role == Role::Assistant && self.content.starts_with("Error: ")
    }

    /// Outbound form: role and content only
    pub fn to_wire(&self) -> WireMessage {
        WireMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// The shape a model transport sees: no source, no timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl WireMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Strip a transcript down to what a transport may see
pub fn to_wire(history: &[Message]) -> Vec<WireMessage> {
    history.iter().map(Message::to_wire).collect()
}
