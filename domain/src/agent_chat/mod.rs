//! Orchestrator chat threads
//!
//! The user's conversation with the orchestrator agent is kept apart from the
//! model conversations. Several named threads may exist; exactly one is
//! current, and there is always at least one.

mod entities;

pub use entities::{AgentChat, AgentChatSummary, AgentChats};
