//! Live session contents

use crate::agent_chat::AgentChats;
use crate::conversation::{ConversationForest, ExpandState};

/// Everything a session snapshot restores: the conversation forest, the agent
/// chats and the tree's expand state.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub forest: ConversationForest,
    pub agent_chats: AgentChats,
    pub expand: ExpandState,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in another session's contents.
    ///
    /// The forest generation advances so that replies still in flight for the
    /// previous contents are discarded.
    pub fn replace(&mut self, other: SessionState) {
        self.forest.replace(other.forest);
        self.agent_chats = other.agent_chats;
        self.expand = other.expand;
    }
}
