//! Session entity

use super::state::SessionState;
use crate::agent_chat::{AgentChat, AgentChats};
use crate::conversation::{ConversationForest, ConversationId, ConversationNode, ExpandState};
use crate::core::message::Message;
use serde::{Deserialize, Serialize};

/// A stored session (Entity)
///
/// Older snapshots carried a single `agentHistory` transcript instead of
/// `agentChats`; [`Session::state`] upgrades those on every load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub last_modified: i64,
    #[serde(default)]
    pub agent_chats: Vec<AgentChat>,
    #[serde(default)]
    pub current_agent_chat_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_history: Option<Vec<Message>>,
    #[serde(default)]
    pub conversations: Vec<ConversationNode>,
    #[serde(default)]
    pub current_conversation_index: usize,
    #[serde(default, alias = "expandedConversations")]
    pub expanded_conversation_ids: Vec<ConversationId>,
}

impl Session {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: id.into(),
            name: name.into(),
            created_at: now,
            last_modified: now,
            agent_chats: Vec::new(),
            current_agent_chat_index: 0,
            agent_history: None,
            conversations: Vec::new(),
            current_conversation_index: 0,
            expanded_conversation_ids: Vec::new(),
        }
    }

    /// Restorable contents of this snapshot
    pub fn state(&self) -> SessionState {
        let agent_chats = match (&self.agent_history, self.agent_chats.is_empty()) {
            (Some(history), true) => AgentChats::from_legacy_history(history.clone()),
            _ => AgentChats::restore(self.agent_chats.clone(), self.current_agent_chat_index),
        };
        SessionState {
            forest: ConversationForest::restore(
                self.conversations.clone(),
                self.current_conversation_index,
            ),
            agent_chats,
            expand: ExpandState::from_ids(self.expanded_conversation_ids.iter().cloned()),
        }
    }

    /// Overwrite this snapshot with live contents and bump `last_modified`
    pub fn capture(&mut self, state: &SessionState) {
        self.agent_chats = state.agent_chats.chats().to_vec();
        self.current_agent_chat_index = state.agent_chats.current_index();
        self.agent_history = None;
        self.conversations = state.forest.nodes().to_vec();
        self.current_conversation_index = state.forest.current_index();
        self.expanded_conversation_ids = state.expand.ids();
        self.last_modified = chrono::Utc::now().timestamp_millis();
    }

    /// Messages across every conversation and agent chat
    pub fn message_count(&self) -> usize {
        let conversations: usize = self.conversations.iter().map(|c| c.history.len()).sum();
        let agent: usize = self.agent_chats.iter().map(|c| c.history.len()).sum();
        conversations + agent + self.agent_history.as_ref().map_or(0, Vec::len)
    }
}
