//! Orchestrator decisions
//!
//! The orchestrator model answers every user turn with a JSON object naming
//! one action. [`AgentAction`] is that object validated into a sum type;
//! [`ResolvedAction`] is the same decision with concrete model bindings.

mod action;

pub use action::{AgentAction, NO_ACTIVE_MODELS_REPLY, ResolvedAction};
