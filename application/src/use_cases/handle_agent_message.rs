//! Handle Agent Message use case
//!
//! One turn of the orchestrator chat: record the request, interpret it,
//! record the agent's reply, then create or branch conversations. Every
//! failure after the request is recorded lands in the agent chat as a
//! message rather than an error.

use super::agent_chats::AgentChatService;
use super::conversation_store::{ChunkSink, ConversationStore};
use super::interpret_command::{InterpretCommandUseCase, InterpretError, InterpretInput};
use crate::ports::model_transport::ModelTransport;
use agentic_domain::{
    ConversationId, ConversationNode, Message, MessageSource, ModelBinding,
    ResolvedAction, find_target_conversation,
};
use tracing::{info, warn};

/// Reply recorded when a branch request names no known conversation
pub const SOURCE_NOT_FOUND_REPLY: &str = "Could not find the source conversation";

/// Input for one agent turn
#[derive(Debug, Clone)]
pub struct AgentTurnInput {
    pub message: String,
    pub active_models: Vec<ModelBinding>,
    pub agent_model: String,
}

/// What a turn ended up doing
#[derive(Debug, Clone)]
pub enum AgentTurn {
    /// Only a chat reply
    Replied,
    Created(Vec<ConversationNode>),
    Branched {
        parent: ConversationId,
        nodes: Vec<ConversationNode>,
    },
    /// The failure text was recorded in the agent chat
    Failed(String),
    /// The session changed while the agent was thinking; nothing was run
    Abandoned,
}

pub struct HandleAgentMessageUseCase<T: ModelTransport + 'static> {
    interpreter: InterpretCommandUseCase<T>,
    conversations: ConversationStore<T>,
    agent_chats: AgentChatService,
}

impl<T: ModelTransport + 'static> HandleAgentMessageUseCase<T> {
    pub fn new(
        interpreter: InterpretCommandUseCase<T>,
        conversations: ConversationStore<T>,
        agent_chats: AgentChatService,
    ) -> Self {
        Self {
            interpreter,
            conversations,
            agent_chats,
        }
    }

    /// Run one turn.
    ///
    /// Only missing credentials are returned as an error, and nothing is
    /// recorded in that case. `on_chunk` streams the first branch of a branch
    /// action.
    pub async fn execute(
        &self,
        input: AgentTurnInput,
        on_chunk: Option<ChunkSink>,
    ) -> Result<AgentTurn, InterpretError> {
        if !self.interpreter.is_configured() {
            return Err(super::missing_credentials().into());
        }

        let generation = self.agent_chats.generation();
        let history = self.agent_chats.history();
        self.agent_chats
            .push(Message::user(input.message.as_str(), MessageSource::User));

        let action = match self
            .interpreter
            .execute(InterpretInput {
                message: input.message,
                history,
                active_models: input.active_models,
                agent_model: input.agent_model,
            })
            .await
        {
            Ok(action) => action,
            Err(e) => {
                warn!("Agent interpretation failed: {}", e);
                return Ok(self.fail(generation, Message::error(&e)));
            }
        };

        if !self
            .agent_chats
            .push_if_generation(generation, Message::assistant(reply_text(&action)))
        {
            return Ok(AgentTurn::Abandoned);
        }

        match action {
            ResolvedAction::Chat { .. } => Ok(AgentTurn::Replied),
            ResolvedAction::Create {
                models,
                initial_prompt,
                ..
            } => match self
                .conversations
                .create_conversations(&models, &initial_prompt)
                .await
            {
                Ok(nodes) => Ok(AgentTurn::Created(nodes)),
                Err(e) => Ok(self.fail(generation, Message::assistant(format!(
                    "Error creating conversations: {}",
                    e
                )))),
            },
            ResolvedAction::Continue {
                source_conversation_id,
                branch_count,
                prompts,
                ..
            } => {
                let parent = self.conversations.workspace().read(|s| {
                    find_target_conversation(&source_conversation_id, s.forest.nodes())
                        .map(|n| n.id.clone())
                });
                let Some(parent) = parent else {
                    info!("Branch source '{}' did not resolve", source_conversation_id);
                    return Ok(self.fail(generation, Message::assistant(SOURCE_NOT_FOUND_REPLY)));
                };
                match self
                    .conversations
                    .branch_conversation(
                        &parent,
                        branch_count,
                        &prompts,
                        MessageSource::Agent,
                        on_chunk,
                    )
                    .await
                {
                    Ok(nodes) => Ok(AgentTurn::Branched { parent, nodes }),
                    Err(e) => Ok(self.fail(
                        generation,
                        Message::assistant(format!("Error branching: {}", e)),
                    )),
                }
            }
        }
    }

    /// Record a failure in the chat the turn started in
    fn fail(&self, generation: u64, message: Message) -> AgentTurn {
        let text = message.content.clone();
        self.agent_chats.push_if_generation(generation, message);
        AgentTurn::Failed(text)
    }
}

/// The agent's own words, or a short default when it gave none
fn reply_text(action: &ResolvedAction) -> String {
    match action {
        ResolvedAction::Chat { response } => response.clone(),
        ResolvedAction::Create {
            models, response, ..
        } => response.clone().unwrap_or_else(|| {
            format!("Creating {} conversations.", models.len())
        }),
        ResolvedAction::Continue {
            branch_count,
            response,
            ..
        } => response
            .clone()
            .unwrap_or_else(|| format!("Creating {} branches.", branch_count)),
    }
}
