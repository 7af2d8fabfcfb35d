//! Domain layer for agentic-chat
//!
//! This crate contains the core data model and the pure algorithms that act on it.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Conversation Forest
//!
//! Every model conversation is a [`ConversationNode`]: an independent transcript
//! bound to one model. Branching copies a node's history into a new child node,
//! so the full set of nodes forms a forest of trees.
//!
//! ## Council
//!
//! A council takes several completed answers, has every answering model rank the
//! anonymized answers, aggregates the rank positions, and asks a chairman model
//! for one synthesized answer.
//!
//! ## Sessions
//!
//! A [`Session`] is a persisted snapshot of the forest plus the orchestrator's
//! own agent chats. Sessions live in a recency-ordered [`SessionRegistry`].

pub mod agent_chat;
pub mod config;
pub mod conversation;
pub mod core;
pub mod council;
pub mod orchestration;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use agent_chat::{AgentChat, AgentChatSummary, AgentChats};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use conversation::{
    ConversationForest, ConversationId, ConversationNode, ConversationTree, ExpandState,
    TreeNode, distribute_models, find_conversation, find_target_conversation,
};
pub use core::{
    error::DomainError,
    message::{Message, MessageSource, Role, WireMessage},
    model::ModelBinding,
};
pub use council::{
    AggregateEntry, CouncilResponse, CouncilResult, RankingEntry, Synthesis,
    calculate_aggregate_rankings, parse_ranking, response_label,
};
pub use orchestration::{AgentAction, NO_ACTIVE_MODELS_REPLY, ResolvedAction};
pub use prompt::{AgentPromptTemplate, CouncilPromptTemplate};
pub use session::{Session, SessionRegistry, SessionState};
