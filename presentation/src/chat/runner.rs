//! Executes one [`Command`] against the application services
//!
//! The binary runs the command given on the command line; the REPL runs the
//! same commands typed as `/tree`, `/send hello` and so on.

use super::context::ChatContext;
use crate::cli::commands::{ChatsCommand, Command, ModelsCommand, SessionsCommand};
use crate::config::OutputConfig;
use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::ProgressReporter;
use agentic_application::{
    AgentTurn, AgentTurnInput, ChunkSink, ConveneCouncilInput, ConversationError, CouncilError,
    InterpretError, ModelTransport, NoProgress, PreferenceError, SessionError,
};
use agentic_domain::{
    ConversationId, ConversationNode, ConversationTree, DomainError, ExpandState, MessageSource,
    ModelBinding, OutputFormat, distribute_models,
};
use colored::Colorize;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Conversation(#[from] ConversationError),

    #[error(transparent)]
    Council(#[from] CouncilError),

    #[error(transparent)]
    Interpret(#[from] InterpretError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Preference(#[from] PreferenceError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("No conversation matches '{0}'")]
    UnknownConversation(String),

    #[error("No active models. Add one with `models add <id>`.")]
    NoActiveModels,

    #[error("`{0}` is only available from the command line")]
    CommandLineOnly(&'static str),

    #[error("{0}")]
    Usage(String),
}

pub struct CommandRunner<T: ModelTransport + 'static> {
    ctx: ChatContext<T>,
    output: OutputConfig,
    show_progress: bool,
    stream_replies: bool,
}

impl<T: ModelTransport + 'static> CommandRunner<T> {
    pub fn new(ctx: ChatContext<T>, output: OutputConfig) -> Self {
        Self {
            ctx,
            output,
            show_progress: true,
            stream_replies: true,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Print replies to `send` as they stream in
    pub fn with_streaming(mut self, stream: bool) -> Self {
        self.stream_replies = stream;
        self
    }

    pub fn context(&self) -> &ChatContext<T> {
        &self.ctx
    }

    fn format(&self) -> OutputFormat {
        self.output.format
    }

    pub async fn run(&self, command: Command) -> Result<(), CommandError> {
        debug!("Running {:?}", command);
        match command {
            Command::Ask {
                prompt,
                count,
                models,
            } => self.ask(&prompt.join(" "), count, &models).await,
            Command::Branch {
                conversation,
                count,
                prompts,
            } => self.branch(&conversation, count, &prompts).await,
            Command::Send {
                message,
                conversation,
            } => self.send(&message.join(" "), conversation.as_deref()).await,
            Command::Next => {
                let node = self.ctx.conversations.next();
                self.print_moved(node);
                Ok(())
            }
            Command::Prev => {
                let node = self.ctx.conversations.previous();
                self.print_moved(node);
                Ok(())
            }
            Command::Show { conversation } => self.show(conversation.as_deref()),
            Command::Tree { all } => {
                self.print_tree(all);
                Ok(())
            }
            Command::Expand {
                conversation,
                reset,
            } => self.expand(conversation.as_deref(), reset).await,
            Command::Council {
                conversations,
                chairman,
            } => self.council(&conversations, chairman).await,
            Command::Agent { message } if message.is_empty() => {
                Err(CommandError::Usage("Nothing to send to the agent".to_string()))
            }
            Command::Agent { message } => self.agent(&message.join(" ")).await,
            Command::Chats(command) => self.chats(command),
            Command::Sessions(command) => self.sessions(command).await,
            Command::Models(command) => self.models(command).await,
            Command::Login(_) => Err(CommandError::CommandLineOnly("login")),
            Command::Config => Err(CommandError::CommandLineOnly("config")),
        }
    }

    // ==================== Conversations ====================

    async fn ask(
        &self,
        prompt: &str,
        count: Option<usize>,
        models: &[String],
    ) -> Result<(), CommandError> {
        let active = self.ctx.preferences.active_models().await;
        let pool: Vec<ModelBinding> = if models.is_empty() {
            active
        } else {
            models
                .iter()
                .map(|term| pick_model(term, &active))
                .collect()
        };
        let bindings = distribute_models(&pool, count.unwrap_or(pool.len()));
        if bindings.is_empty() {
            return Err(CommandError::NoActiveModels);
        }

        if !self.format().is_json() {
            println!(
                "{} {} conversations...",
                "Asking".cyan().bold(),
                bindings.len()
            );
        }
        let nodes = self
            .ctx
            .conversations
            .create_conversations(&bindings, prompt)
            .await?;
        self.print_nodes(&nodes);
        Ok(())
    }

    async fn branch(
        &self,
        conversation: &str,
        count: usize,
        prompts: &[String],
    ) -> Result<(), CommandError> {
        let parent = self.conversation_id(conversation)?;
        let nodes = self
            .ctx
            .conversations
            .branch_conversation(&parent, count, prompts, MessageSource::User, None)
            .await?;
        self.print_nodes(&nodes);
        Ok(())
    }

    async fn send(&self, message: &str, conversation: Option<&str>) -> Result<(), CommandError> {
        if let Some(term) = conversation {
            let id = self.conversation_id(term)?;
            self.ctx.conversations.select(&id)?;
        }

        if self.format().is_json() {
            let reply = self.ctx.conversations.send_user_message(message, None).await?;
            println!("{}", ConsoleFormatter::json(&reply));
            return Ok(());
        }

        let node = self
            .ctx
            .conversations
            .current()
            .ok_or(DomainError::NoActiveConversation)?;
        println!("{}", format!("── {} ──", node.model_name).yellow().bold());

        if self.stream_replies {
            let sink: ChunkSink = Arc::new(|_: &ConversationId, chunk: &str| {
                print!("{}", chunk);
                let _ = std::io::stdout().flush();
            });
            let result = self
                .ctx
                .conversations
                .send_user_message(message, Some(sink))
                .await;
            println!();
            result?;
        } else {
            let reply = self.ctx.conversations.send_user_message(message, None).await?;
            println!("{}", reply.content);
        }
        Ok(())
    }

    fn show(&self, conversation: Option<&str>) -> Result<(), CommandError> {
        let node = match conversation {
            Some(term) => {
                let id = self.conversation_id(term)?;
                self.ctx.conversations.get(&id)
            }
            None => self.ctx.conversations.current(),
        }
        .ok_or(DomainError::NoActiveConversation)?;
        self.print_node(&node);
        Ok(())
    }

    async fn expand(&self, conversation: Option<&str>, reset: bool) -> Result<(), CommandError> {
        if reset {
            self.ctx.conversations.reset_expanded();
        } else {
            let id = match conversation {
                Some(term) => self.conversation_id(term)?,
                None => self
                    .ctx
                    .conversations
                    .current()
                    .map(|n| n.id)
                    .ok_or(DomainError::NoActiveConversation)?,
            };
            self.ctx.conversations.toggle_expanded(&id);
        }
        self.ctx
            .preferences
            .set_expanded_ids(&self.ctx.conversations.expanded_ids())
            .await?;
        self.print_tree(false);
        Ok(())
    }

    // ==================== Council and agent ====================

    async fn council(
        &self,
        conversations: &[String],
        chairman: Option<String>,
    ) -> Result<(), CommandError> {
        let conversation_ids = conversations
            .iter()
            .map(|term| self.conversation_id(term))
            .collect::<Result<Vec<_>, _>>()?;
        let input = ConveneCouncilInput {
            conversation_ids,
            chairman_model_id: chairman,
        };

        let result = if self.show_progress && !self.format().is_json() {
            let progress = ProgressReporter::new();
            self.ctx.council.execute_with_progress(input, &progress).await?
        } else {
            self.ctx.council.execute_with_progress(input, &NoProgress).await?
        };

        let output = match self.format() {
            OutputFormat::Full => ConsoleFormatter::council(&result),
            OutputFormat::Synthesis => ConsoleFormatter::council_synthesis_only(&result),
            OutputFormat::Json => ConsoleFormatter::json(&result),
        };
        println!("{}", output);
        Ok(())
    }

    /// One orchestrator turn, printing the agent's reply and any new conversations
    pub async fn agent(&self, message: &str) -> Result<(), CommandError> {
        let input = AgentTurnInput {
            message: message.to_string(),
            active_models: self.ctx.preferences.active_models().await,
            agent_model: self.ctx.preferences.agent_model().await,
        };
        let turn = self.ctx.agent.execute(input, None).await?;
        let reply = match turn {
            AgentTurn::Abandoned => None,
            _ => self.ctx.agent_chats.history().pop(),
        };

        if self.format().is_json() {
            let nodes = match &turn {
                AgentTurn::Created(nodes) | AgentTurn::Branched { nodes, .. } => nodes.clone(),
                AgentTurn::Replied | AgentTurn::Failed(_) | AgentTurn::Abandoned => Vec::new(),
            };
            println!(
                "{}",
                ConsoleFormatter::json(&json!({
                    "reply": reply.map(|m| m.content),
                    "failed": matches!(turn, AgentTurn::Failed(_)),
                    "conversations": nodes,
                }))
            );
            return Ok(());
        }

        if let Some(reply) = &reply {
            print!("{}", ConsoleFormatter::agent_reply(reply));
        }
        match turn {
            AgentTurn::Created(nodes) | AgentTurn::Branched { nodes, .. } => {
                println!();
                self.print_nodes(&nodes);
            }
            AgentTurn::Replied | AgentTurn::Failed(_) | AgentTurn::Abandoned => {}
        }
        Ok(())
    }

    fn chats(&self, command: ChatsCommand) -> Result<(), CommandError> {
        let chats = &self.ctx.agent_chats;
        match command {
            ChatsCommand::List => {
                let summaries = chats.summaries();
                if self.format().is_json() {
                    println!("{}", ConsoleFormatter::json(&summaries));
                } else {
                    print!("{}", ConsoleFormatter::agent_chats(&summaries));
                }
            }
            ChatsCommand::New { name } => {
                let chat = chats.create(name);
                println!("Started {} ({})", chat.name.bold(), chat.id);
            }
            ChatsCommand::Switch { id } => {
                let chat = chats.switch(&id)?;
                println!("Switched to {}", chat.name.bold());
            }
            ChatsCommand::Rename { id, name } => {
                chats.rename(&id, &name)?;
                println!("Renamed chat {} to {}", id, name.bold());
            }
            ChatsCommand::Delete { id } => {
                chats.delete(&id)?;
                println!("Deleted chat {}", id);
            }
            ChatsCommand::Show => {
                let chat = chats.current();
                if self.format().is_json() {
                    println!("{}", ConsoleFormatter::json(&chat));
                } else {
                    print!("{}", ConsoleFormatter::agent_chat(&chat));
                }
            }
        }
        Ok(())
    }

    // ==================== Sessions and models ====================

    async fn sessions(&self, command: SessionsCommand) -> Result<(), CommandError> {
        let sessions = &self.ctx.sessions;
        match command {
            SessionsCommand::List => {
                let list = sessions.list().await;
                if self.format().is_json() {
                    println!("{}", ConsoleFormatter::json(&list));
                } else {
                    print!("{}", ConsoleFormatter::sessions(&list));
                }
            }
            SessionsCommand::New => {
                let session = sessions.create().await?;
                println!("Started {} ({})", session.name.bold(), session.id.dimmed());
            }
            SessionsCommand::Load { id } => {
                let session = sessions.load(&id).await?;
                println!(
                    "Loaded {} with {} conversations",
                    session.name.bold(),
                    session.conversations.len()
                );
            }
            SessionsCommand::Delete { id } => match sessions.delete(&id).await? {
                Some(current) => println!("Deleted {}; now in {}", id, current.dimmed()),
                None => {
                    let session = sessions.create().await?;
                    println!("Deleted {}; started {}", id, session.name.bold());
                }
            },
            SessionsCommand::Rename { id, name } => {
                sessions.rename(&id, &name).await?;
                println!("Renamed session {} to {}", id, name.bold());
            }
        }
        Ok(())
    }

    async fn models(&self, command: ModelsCommand) -> Result<(), CommandError> {
        let prefs = &self.ctx.preferences;
        match command {
            ModelsCommand::List => {
                let active = prefs.active_models().await;
                let agent = prefs.agent_model().await;
                if self.format().is_json() {
                    println!(
                        "{}",
                        ConsoleFormatter::json(&json!({ "active": active, "agent": agent }))
                    );
                } else {
                    print!("{}", ConsoleFormatter::models(&active, &agent));
                }
            }
            ModelsCommand::Add { id, name } => {
                let model = match name {
                    Some(name) => ModelBinding::new(id.as_str(), name),
                    None => named_after_id(&id),
                };
                if prefs.add_active_model(model.clone()).await? {
                    println!("Added {}", model);
                } else {
                    println!("{} is already active", model.id);
                }
            }
            ModelsCommand::Remove { id } => {
                let removed = prefs.remove_active_model(&id).await?;
                println!("Removed {}", removed);
            }
            ModelsCommand::Agent { id: Some(id) } => {
                prefs.set_agent_model(&id).await?;
                println!("Agent model set to {}", id.bold());
            }
            ModelsCommand::Agent { id: None } => {
                println!("{}", prefs.agent_model().await);
            }
        }
        Ok(())
    }

    // ==================== Printing ====================

    fn conversation_id(&self, term: &str) -> Result<ConversationId, CommandError> {
        self.ctx
            .resolve_conversation(term)
            .ok_or_else(|| CommandError::UnknownConversation(term.to_string()))
    }

    fn print_node(&self, node: &ConversationNode) {
        let output = match self.format() {
            OutputFormat::Full => {
                let label = self.ctx.label_of(&node.id);
                ConsoleFormatter::transcript(node, label.as_deref())
            }
            OutputFormat::Synthesis => ConsoleFormatter::latest_reply(node),
            OutputFormat::Json => ConsoleFormatter::json(node),
        };
        println!("{}", output);
    }

    fn print_nodes(&self, nodes: &[ConversationNode]) {
        match self.format() {
            OutputFormat::Json => println!("{}", ConsoleFormatter::json(nodes)),
            OutputFormat::Full => {
                print!("{}", ConsoleFormatter::node_summaries(nodes));
                for node in nodes {
                    println!();
                    print!("{}", ConsoleFormatter::latest_reply(node));
                }
            }
            OutputFormat::Synthesis => {
                for node in nodes {
                    print!("{}", ConsoleFormatter::latest_reply(node));
                }
            }
        }
    }

    fn print_moved(&self, node: Option<ConversationNode>) {
        match node {
            Some(node) if self.format().is_json() => println!("{}", ConsoleFormatter::json(&node)),
            Some(node) => {
                let label = self.ctx.label_of(&node.id).unwrap_or_default();
                println!(
                    "Now at {}. {} {}",
                    label.bold(),
                    ConsoleFormatter::badge(&node.model()),
                    node.first_prompt().unwrap_or_default()
                );
            }
            None => println!("{}", "No conversations yet.".dimmed()),
        }
    }

    fn print_tree(&self, all: bool) {
        let workspace = self.ctx.workspace();
        if self.format().is_json() {
            let rows = workspace.read(|s| {
                ConversationTree::build(s.forest.nodes(), &s.expand)
                    .all_nodes()
                    .into_iter()
                    .map(|row| {
                        json!({
                            "label": row.label,
                            "id": row.node.id,
                            "parentId": row.node.parent_id,
                            "modelId": row.node.model_id,
                            "modelName": row.node.model_name,
                            "depth": row.depth,
                            "expanded": row.is_expanded,
                            "prompt": row.node.first_prompt(),
                            "branches": row.children.len(),
                        })
                    })
                    .collect::<Vec<_>>()
            });
            println!("{}", ConsoleFormatter::json(&rows));
            return;
        }

        let output = workspace.read(|s| {
            let current = s.forest.current().map(|n| n.id.clone());
            if all {
                let everything = ExpandState::from_ids(s.forest.nodes().iter().map(|n| n.id.clone()));
                ConsoleFormatter::tree(s.forest.nodes(), &everything, current.as_ref())
            } else {
                ConsoleFormatter::tree(s.forest.nodes(), &s.expand, current.as_ref())
            }
        });
        print!("{}", output);
    }
}

/// An active model matching `term` by id or name, else a new binding for it
fn pick_model(term: &str, active: &[ModelBinding]) -> ModelBinding {
    let needle = term.to_lowercase();
    active
        .iter()
        .find(|m| m.id == term)
        .or_else(|| active.iter().find(|m| m.name.to_lowercase().contains(&needle)))
        .cloned()
        .unwrap_or_else(|| named_after_id(term))
}

/// `vendor/model-name` displays as `model-name`
fn named_after_id(id: &str) -> ModelBinding {
    ModelBinding::new(id, id.rsplit('/').next().unwrap_or(id))
}
