//! State change notifications
//!
//! Every mutation of the working state is announced on an [`EventBus`].
//! Any number of subscribers (auto-save, a live renderer, tests) can listen
//! independently; publishing with nobody listening is not an error.

use agentic_domain::ConversationId;
use tokio::sync::broadcast;

/// What changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    /// Root conversations were appended; fired before any reply arrives
    ConversationsCreated { ids: Vec<ConversationId> },
    /// Branches were appended; fired before any reply arrives
    BranchesCreated {
        parent: ConversationId,
        ids: Vec<ConversationId>,
    },
    /// A user message was appended to a conversation
    MessageAppended { id: ConversationId },
    /// A reply (or recorded failure) landed in a conversation
    ConversationCompleted { id: ConversationId, success: bool },
    /// The current conversation pointer moved
    CurrentChanged { index: usize },
    /// Tree expand/collapse state changed
    ExpandChanged,
    /// The agent chats changed
    AgentChatChanged,
    /// The whole state was replaced by another session
    SessionSwitched { session_id: String },
}

impl StateEvent {
    /// Whether the event changes anything worth persisting
    pub fn is_persistent(&self) -> bool {
        !matches!(self, StateEvent::SessionSwitched { .. })
    }
}

/// Multi-subscriber broadcast of [`StateEvent`]s
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StateEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: StateEvent) {
        // No subscribers is fine.
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
