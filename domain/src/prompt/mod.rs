//! Prompt domain
//!
//! Templates for the orchestrator's system prompt and the two council stages.

pub mod agent;
pub mod council;

pub use agent::AgentPromptTemplate;
pub use council::CouncilPromptTemplate;
