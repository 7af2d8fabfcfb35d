//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod agent_chats;
pub mod autosave;
pub mod conversation_store;
pub mod convene_council;
pub mod handle_agent_message;
pub mod interpret_command;
pub mod preferences;
pub mod run_council;
pub mod session_manager;

#[cfg(test)]
pub(crate) mod test_support;

use agentic_domain::DomainError;

/// Error for any operation that needs an API key when none is set
pub(crate) fn missing_credentials() -> DomainError {
    DomainError::Configuration(
        "API key not configured. Run `agentic-chat login` or set OPENROUTER_API_KEY.".to_string(),
    )
}
