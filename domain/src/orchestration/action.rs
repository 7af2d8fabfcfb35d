//! Orchestrator action types

use crate::conversation::distribute_models;
use crate::core::error::DomainError;
use crate::core::model::ModelBinding;
use serde::{Deserialize, Serialize};

/// Reply used instead of asking the orchestrator when no model is active
pub const NO_ACTIVE_MODELS_REPLY: &str =
    "You need to add some active models first! Use `models add <id>` to get started.";

/// A decision returned by the orchestrator model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum AgentAction {
    /// Fan one prompt out to `conversation_count` new root conversations
    CreateConversations {
        conversation_count: usize,
        initial_prompt: String,
        #[serde(default)]
        response: Option<String>,
    },
    /// Branch an existing conversation
    ContinueConversations {
        source_conversation_id: String,
        branch_count: usize,
        prompts: Vec<String>,
        #[serde(default)]
        response: Option<String>,
    },
    /// Plain reply, nothing is created
    Chat { response: String },
}

impl AgentAction {
    /// Parse and validate the orchestrator's raw output.
    ///
    /// Surrounding prose or a fenced code block around the JSON object is
    /// tolerated.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let json = extract_object(raw)
            .ok_or_else(|| DomainError::InvalidAction("no JSON object in reply".to_string()))?;
        let action: AgentAction = serde_json::from_str(json)
            .map_err(|e| DomainError::InvalidAction(e.to_string()))?;
        action.validate()?;
        Ok(action)
    }

    fn validate(&self) -> Result<(), DomainError> {
        match self {
            AgentAction::CreateConversations {
                conversation_count,
                initial_prompt,
                ..
            } => {
                if *conversation_count == 0 {
                    return Err(DomainError::InvalidAction(
                        "conversationCount must be at least 1".to_string(),
                    ));
                }
                if initial_prompt.trim().is_empty() {
                    return Err(DomainError::InvalidAction(
                        "initialPrompt is empty".to_string(),
                    ));
                }
            }
            AgentAction::ContinueConversations {
                branch_count,
                prompts,
                ..
            } => {
                if *branch_count == 0 {
                    return Err(DomainError::InvalidAction(
                        "branchCount must be at least 1".to_string(),
                    ));
                }
                if prompts.is_empty() {
                    return Err(DomainError::InvalidAction("prompts is empty".to_string()));
                }
            }
            AgentAction::Chat { .. } => {}
        }
        Ok(())
    }

    /// Attach concrete models to a create decision.
    ///
    /// With no active models every decision degrades to a chat reply.
    pub fn resolve(self, active: &[ModelBinding]) -> ResolvedAction {
        if active.is_empty() {
            return ResolvedAction::Chat {
                response: NO_ACTIVE_MODELS_REPLY.to_string(),
            };
        }
        match self {
            AgentAction::CreateConversations {
                conversation_count,
                initial_prompt,
                response,
            } => ResolvedAction::Create {
                models: distribute_models(active, conversation_count),
                initial_prompt,
                response,
            },
            AgentAction::ContinueConversations {
                source_conversation_id,
                branch_count,
                prompts,
                response,
            } => ResolvedAction::Continue {
                source_conversation_id,
                branch_count,
                prompts,
                response,
            },
            AgentAction::Chat { response } => ResolvedAction::Chat { response },
        }
    }
}

/// An orchestrator decision ready to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAction {
    Create {
        models: Vec<ModelBinding>,
        initial_prompt: String,
        response: Option<String>,
    },
    Continue {
        source_conversation_id: String,
        branch_count: usize,
        prompts: Vec<String>,
        response: Option<String>,
    },
    Chat {
        response: String,
    },
}

impl ResolvedAction {
    /// Short action name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            ResolvedAction::Create { .. } => "create_conversations",
            ResolvedAction::Continue { .. } => "continue_conversations",
            ResolvedAction::Chat { .. } => "chat",
        }
    }
}

fn extract_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}
