//! Conversation store use case
//!
//! Owns every write to the conversation forest: fan-out creation, branching,
//! direct sends, navigation and expand state. Nodes are appended before any
//! model call is issued, and each reply is written back by the task that
//! awaited it.
//!
//! Batch operations (create, branch) turn a failed model call into an
//! `Error: <message>` reply on that node and carry on. A direct send records
//! the failure the same way and also returns it.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::events::{EventBus, StateEvent};
use crate::ports::model_transport::{CompletionOptions, GatewayError, ModelTransport};
use crate::workspace::Workspace;
use agentic_domain::core::message::to_wire;
use agentic_domain::{
    ConversationId, ConversationNode, DomainError, Message, MessageSource, ModelBinding,
    WireMessage,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::{self, JoinSet};
use tracing::{debug, info, warn};

/// Receives streamed text for one conversation, in arrival order
pub type ChunkSink = Arc<dyn Fn(&ConversationId, &str) + Send + Sync>;

/// Errors from conversation store operations
#[derive(Error, Debug)]
pub enum ConversationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Transport(#[from] GatewayError),
}

/// One model call of a batch
struct ReplyJob {
    id: ConversationId,
    model_id: String,
    messages: Vec<WireMessage>,
    sink: Option<ChunkSink>,
}

pub struct ConversationStore<T: ModelTransport + 'static> {
    transport: Arc<T>,
    workspace: Workspace,
    events: EventBus,
    logger: Arc<dyn ConversationLogger>,
}

impl<T: ModelTransport + 'static> ConversationStore<T> {
    pub fn new(transport: Arc<T>, workspace: Workspace, events: EventBus) -> Self {
        Self {
            transport,
            workspace,
            events,
            logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    fn ensure_configured(&self) -> Result<(), ConversationError> {
        if self.transport.is_configured() {
            Ok(())
        } else {
            Err(super::missing_credentials().into())
        }
    }

    // ==================== Creation ====================

    /// Create one root conversation per binding, all seeded with `prompt`,
    /// and wait until every reply has settled.
    ///
    /// Returns the new nodes as they stand after the batch. An empty binding
    /// list creates nothing.
    pub async fn create_conversations(
        &self,
        bindings: &[ModelBinding],
        prompt: &str,
    ) -> Result<Vec<ConversationNode>, ConversationError> {
        self.ensure_configured()?;

        let (ids, generation) = self.workspace.write(|s| {
            let ids = s.forest.create_roots(bindings, prompt);
            (ids, s.forest.generation())
        });
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        info!("Created {} conversations", ids.len());
        self.logger.log(ConversationEvent::new(
            "conversations_created",
            json!({
                "ids": ids.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
                "models": bindings.iter().map(|b| b.id.as_str()).collect::<Vec<_>>(),
                "prompt": prompt,
            }),
        ));
        self.events
            .publish(StateEvent::ConversationsCreated { ids: ids.clone() });

        let jobs = ids
            .iter()
            .zip(bindings)
            .map(|(id, binding)| ReplyJob {
                id: id.clone(),
                model_id: binding.id.clone(),
                messages: vec![WireMessage::user(prompt)],
                sink: None,
            })
            .collect();
        self.run_batch(jobs, generation).await;

        Ok(self.nodes(&ids))
    }

    /// Branch `parent_id` into `count` new conversations.
    ///
    /// Branch `i` asks `prompts[i]`, or `prompts[0]` when fewer prompts were
    /// given. Only the first branch streams, and only when `on_chunk` is set.
    pub async fn branch_conversation(
        &self,
        parent_id: &ConversationId,
        count: usize,
        prompts: &[String],
        source: MessageSource,
        on_chunk: Option<ChunkSink>,
    ) -> Result<Vec<ConversationNode>, ConversationError> {
        self.ensure_configured()?;

        let (jobs, generation) = self.workspace.write(|s| {
            let ids = s.forest.create_branches(parent_id, count, prompts, source)?;
            let jobs: Vec<ReplyJob> = ids
                .iter()
                .filter_map(|id| s.forest.get(id))
                .map(|node| ReplyJob {
                    id: node.id.clone(),
                    model_id: node.model_id.clone(),
                    messages: to_wire(&node.history),
                    sink: None,
                })
                .collect();
            Ok::<_, DomainError>((jobs, s.forest.generation()))
        })?;

        let ids: Vec<ConversationId> = jobs.iter().map(|j| j.id.clone()).collect();
        info!("Created {} branches from conversation {}", ids.len(), parent_id);
        self.logger.log(ConversationEvent::new(
            "branches_created",
            json!({
                "parent": parent_id.as_str(),
                "ids": ids.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
                "prompts": prompts,
            }),
        ));
        self.events.publish(StateEvent::BranchesCreated {
            parent: parent_id.clone(),
            ids: ids.clone(),
        });

        let jobs = jobs
            .into_iter()
            .enumerate()
            .map(|(i, mut job)| {
                if i == 0 {
                    job.sink = on_chunk.clone();
                }
                job
            })
            .collect();
        self.run_batch(jobs, generation).await;

        Ok(self.nodes(&ids))
    }

    /// Send a user message to the current conversation.
    ///
    /// The reply is returned; a failed call is recorded as an `Error:` reply
    /// and then returned as the error.
    pub async fn send_user_message(
        &self,
        content: &str,
        on_chunk: Option<ChunkSink>,
    ) -> Result<Message, ConversationError> {
        self.ensure_configured()?;

        let (id, model_id, messages, generation) = self.workspace.write(|s| {
            let node = s.forest.current().ok_or(DomainError::NoActiveConversation)?;
            let id = node.id.clone();
            let model_id = node.model_id.clone();
            s.forest
                .append(&id, Message::user(content, MessageSource::User))?;
            let messages = s.forest.get(&id).map(|n| to_wire(&n.history)).unwrap_or_default();
            Ok::<_, DomainError>((id, model_id, messages, s.forest.generation()))
        })?;
        self.events
            .publish(StateEvent::MessageAppended { id: id.clone() });

        let job = ReplyJob {
            id: id.clone(),
            model_id,
            messages,
            sink: on_chunk,
        };
        let result = call_model(self.transport.as_ref(), &job).await;
        let success = result.is_ok();
        let message = match &result {
            Ok(text) => Message::assistant(text.as_str()),
            Err(e) => Message::error(e),
        };
        self.record_reply(generation, &job, message.clone(), &result);
        self.events
            .publish(StateEvent::ConversationCompleted { id, success });

        match result {
            Ok(_) => Ok(message),
            Err(e) => Err(e.into()),
        }
    }

    /// Run every job in parallel and write each reply as it arrives.
    ///
    /// A task that dies without a result still leaves an `Error:` reply on
    /// its node.
    async fn run_batch(&self, jobs: Vec<ReplyJob>, generation: u64) {
        let mut join_set = JoinSet::new();
        let mut pending: HashMap<task::Id, (ConversationId, String)> = HashMap::new();
        for job in jobs {
            let transport = Arc::clone(&self.transport);
            let owner = (job.id.clone(), job.model_id.clone());
            let handle = join_set.spawn(async move {
                let result = call_model(transport.as_ref(), &job).await;
                (job, result)
            });
            pending.insert(handle.id(), owner);
        }

        while let Some(joined) = join_set.join_next().await {
            let (job, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    warn!("Task join error: {}", e);
                    let Some((id, model_id)) = pending.remove(&e.id()) else {
                        continue;
                    };
                    let job = ReplyJob {
                        id,
                        model_id,
                        messages: Vec::new(),
                        sink: None,
                    };
                    let failure = GatewayError::RequestFailed(e.to_string());
                    (job, Err(failure))
                }
            };
            let success = result.is_ok();
            let message = match &result {
                Ok(text) => Message::assistant(text.as_str()),
                Err(e) => Message::error(e),
            };
            self.record_reply(generation, &job, message, &result);
            self.events.publish(StateEvent::ConversationCompleted {
                id: job.id,
                success,
            });
        }
    }

    fn record_reply(
        &self,
        generation: u64,
        job: &ReplyJob,
        message: Message,
        result: &Result<String, GatewayError>,
    ) {
        match result {
            Ok(text) => {
                debug!("Model {} replied in conversation {}", job.model_id, job.id);
                self.logger.log(ConversationEvent::new(
                    "model_response",
                    json!({
                        "conversation": job.id.as_str(),
                        "model": job.model_id,
                        "content": text,
                    }),
                ));
            }
            Err(e) => {
                warn!("Model {} failed in conversation {}: {}", job.model_id, job.id, e);
                self.logger.log(ConversationEvent::new(
                    "model_error",
                    json!({
                        "conversation": job.id.as_str(),
                        "model": job.model_id,
                        "error": e.to_string(),
                    }),
                ));
            }
        }

        let written = self
            .workspace
            .write(|s| s.forest.append_if_generation(generation, &job.id, message));
        if !written {
            info!(
                "Discarding reply for conversation {}: session changed while it was in flight",
                job.id
            );
        }
    }

    fn nodes(&self, ids: &[ConversationId]) -> Vec<ConversationNode> {
        self.workspace.read(|s| {
            ids.iter()
                .filter_map(|id| s.forest.get(id).cloned())
                .collect()
        })
    }

    // ==================== Queries ====================

    pub fn conversations(&self) -> Vec<ConversationNode> {
        self.workspace.read(|s| s.forest.nodes().to_vec())
    }

    pub fn current(&self) -> Option<ConversationNode> {
        self.workspace.read(|s| s.forest.current().cloned())
    }

    pub fn current_index(&self) -> usize {
        self.workspace.read(|s| s.forest.current_index())
    }

    pub fn get(&self, id: &ConversationId) -> Option<ConversationNode> {
        self.workspace.read(|s| s.forest.get(id).cloned())
    }

    // ==================== Navigation ====================

    /// Move to the next conversation, wrapping around. `None` when empty.
    pub fn next(&self) -> Option<ConversationNode> {
        let moved = self
            .workspace
            .write(|s| s.forest.next().cloned().map(|n| (n, s.forest.current_index())));
        self.announce_move(moved)
    }

    /// Move to the previous conversation, wrapping around. `None` when empty.
    pub fn previous(&self) -> Option<ConversationNode> {
        let moved = self
            .workspace
            .write(|s| s.forest.previous().cloned().map(|n| (n, s.forest.current_index())));
        self.announce_move(moved)
    }

    /// Make `id` current and reveal it in the tree
    pub fn select(&self, id: &ConversationId) -> Result<ConversationNode, ConversationError> {
        let (node, index) = self.workspace.write(|s| {
            let node = s.forest.select(id)?.clone();
            let index = s.forest.current_index();
            let nodes = s.forest.nodes().to_vec();
            s.expand.expand_path_to(id, &nodes);
            Ok::<_, DomainError>((node, index))
        })?;
        self.events.publish(StateEvent::CurrentChanged { index });
        Ok(node)
    }

    fn announce_move(&self, moved: Option<(ConversationNode, usize)>) -> Option<ConversationNode> {
        let (node, index) = moved?;
        self.events.publish(StateEvent::CurrentChanged { index });
        Some(node)
    }

    // ==================== Expand state ====================

    /// Flip a node's expand state; returns the new state
    pub fn toggle_expanded(&self, id: &ConversationId) -> bool {
        let expanded = self.workspace.write(|s| s.expand.toggle(id));
        self.events.publish(StateEvent::ExpandChanged);
        expanded
    }

    pub fn set_expanded(&self, id: &ConversationId, expanded: bool) {
        self.workspace.write(|s| s.expand.set(id, expanded));
        self.events.publish(StateEvent::ExpandChanged);
    }

    pub fn reset_expanded(&self) {
        self.workspace.write(|s| s.expand.reset());
        self.events.publish(StateEvent::ExpandChanged);
    }

    pub fn expanded_ids(&self) -> Vec<ConversationId> {
        self.workspace.read(|s| s.expand.ids())
    }
}

async fn call_model<T: ModelTransport + ?Sized>(
    transport: &T,
    job: &ReplyJob,
) -> Result<String, GatewayError> {
    let options = CompletionOptions::default();
    match &job.sink {
        Some(sink) => {
            let handle = transport
                .send_streaming(&job.model_id, &job.messages, &options)
                .await?;
            handle.collect_text_with(|delta| sink(&job.id, delta)).await
        }
        None => {
            transport
                .send_completion(&job.model_id, &job.messages, &options)
                .await
        }
    }
}
