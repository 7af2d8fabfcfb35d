//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("No active conversation")]
    NoActiveConversation,

    #[error("Council requires at least 2 responses (got {count})")]
    InsufficientResponses { count: usize },

    #[error("Council supports at most 26 responses (got {count})")]
    TooManyResponses { count: usize },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid agent action: {0}")]
    InvalidAction(String),
}

impl DomainError {
    pub fn conversation_not_found(id: impl Into<String>) -> Self {
        DomainError::NotFound {
            kind: "Conversation",
            id: id.into(),
        }
    }

    pub fn session_not_found(id: impl Into<String>) -> Self {
        DomainError::NotFound {
            kind: "Session",
            id: id.into(),
        }
    }

    pub fn agent_chat_not_found(id: impl Into<String>) -> Self {
        DomainError::NotFound {
            kind: "Agent chat",
            id: id.into(),
        }
    }

    /// Check if this error is a lookup miss
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }
}
