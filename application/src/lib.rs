//! Application layer for agentic-chat
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;
pub mod workspace;

// Re-export commonly used types
pub use config::ChatParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    events::{EventBus, StateEvent},
    model_transport::{
        CompletionOptions, GatewayError, ModelTransport, StreamEvent, StreamHandle,
    },
    progress::{CouncilStage, NoProgress, ProgressNotifier},
    session_store::{PreferenceStore, SessionStore, StoreError},
};
pub use use_cases::agent_chats::AgentChatService;
pub use use_cases::autosave::AutoSaver;
pub use use_cases::conversation_store::{ChunkSink, ConversationError, ConversationStore};
pub use use_cases::convene_council::{ConveneCouncilInput, ConveneCouncilUseCase};
pub use use_cases::handle_agent_message::{
    AgentTurn, AgentTurnInput, HandleAgentMessageUseCase, SOURCE_NOT_FOUND_REPLY,
};
pub use use_cases::interpret_command::{InterpretCommandUseCase, InterpretError, InterpretInput};
pub use use_cases::preferences::{PreferenceError, Preferences};
pub use use_cases::run_council::{CouncilError, RunCouncilInput, RunCouncilUseCase};
pub use use_cases::session_manager::{SessionError, SessionManager, SessionSummary};
pub use workspace::Workspace;
