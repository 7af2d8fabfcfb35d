//! Agent chat entities

use crate::core::error::DomainError;
use crate::core::message::{Message, Role};
use serde::{Deserialize, Serialize};

/// One orchestrator thread (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentChat {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub history: Vec<Message>,
    #[serde(default)]
    pub created_at: i64,
}

impl AgentChat {
    fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            name: name.into(),
            history: Vec::new(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Listing row for an agent chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentChatSummary {
    pub id: String,
    pub name: String,
    pub created_at: i64,
    pub message_count: usize,
    pub is_current: bool,
}

/// The ordered set of agent chats with a current pointer.
///
/// Every constructor and mutation leaves at least one chat in place, so the
/// accessors never fail.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentChats {
    chats: Vec<AgentChat>,
    current: usize,
    next_id: u64,
}

impl Default for AgentChats {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentChats {
    pub fn new() -> Self {
        Self::restore(Vec::new(), 0)
    }

    /// Rebuild from persisted chats; an empty list gets a default chat.
    pub fn restore(chats: Vec<AgentChat>, current_index: usize) -> Self {
        let next_id = chats
            .iter()
            .map(|c| c.id.parse::<u64>().unwrap_or(0))
            .max()
            .unwrap_or(0)
            + 1;
        let mut restored = Self {
            chats,
            current: current_index,
            next_id,
        };
        restored.ensure_agent_chat();
        restored
    }

    /// Upgrade a single-thread transcript into a one-chat list
    pub fn from_legacy_history(history: Vec<Message>) -> Self {
        let mut chat = AgentChat::new(1, "Agent Chat 1");
        chat.history = history;
        Self::restore(vec![chat], 0)
    }

    fn ensure_agent_chat(&mut self) {
        if self.chats.is_empty() {
            let id = self.next_id;
            self.next_id += 1;
            self.chats.push(AgentChat::new(id, format!("Agent Chat {}", id)));
        }
        if self.current >= self.chats.len() {
            self.current = self.chats.len() - 1;
        }
    }

    pub fn chats(&self) -> &[AgentChat] {
        &self.chats
    }

    pub fn len(&self) -> usize {
        self.chats.len()
    }

    /// Always false: the set is never empty
    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &AgentChat {
        &self.chats[self.current]
    }

    pub fn history(&self) -> &[Message] {
        &self.current().history
    }

    /// Append to the current chat and return the stored message
    pub fn push(&mut self, message: Message) -> &Message {
        let history = &mut self.chats[self.current].history;
        history.push(message);
        &history[history.len() - 1]
    }

    /// Convenience for plain role/content entries
    pub fn add_message(&mut self, role: Role, content: impl Into<String>) -> &Message {
        self.push(Message::plain(role, content))
    }

    pub fn clear_current(&mut self) {
        self.chats[self.current].history.clear();
    }

    /// Create a chat and make it current. Default name is `Agent Chat <id>`.
    pub fn create(&mut self, name: Option<String>) -> &AgentChat {
        let id = self.next_id;
        self.next_id += 1;
        let name = name.unwrap_or_else(|| format!("Agent Chat {}", id));
        self.chats.push(AgentChat::new(id, name));
        self.current = self.chats.len() - 1;
        &self.chats[self.current]
    }

    pub fn switch(&mut self, id: &str) -> Result<&AgentChat, DomainError> {
        let index = self.index_of(id)?;
        self.current = index;
        Ok(&self.chats[index])
    }

    pub fn rename(&mut self, id: &str, name: impl Into<String>) -> Result<(), DomainError> {
        let index = self.index_of(id)?;
        self.chats[index].name = name.into();
        Ok(())
    }

    /// Delete a chat.
    ///
    /// The last remaining chat is never removed; its history is cleared
    /// instead. Otherwise the current index is clamped to the new end, or
    /// shifted down when it pointed past the removed slot.
    pub fn delete(&mut self, id: &str) -> Result<(), DomainError> {
        let index = self.index_of(id)?;
        if self.chats.len() <= 1 {
            self.chats[0].history.clear();
            return Ok(());
        }
        self.chats.remove(index);
        if self.current >= self.chats.len() {
            self.current = self.chats.len() - 1;
        } else if self.current > index {
            self.current -= 1;
        }
        Ok(())
    }

    pub fn summaries(&self) -> Vec<AgentChatSummary> {
        self.chats
            .iter()
            .enumerate()
            .map(|(i, c)| AgentChatSummary {
                id: c.id.clone(),
                name: c.name.clone(),
                created_at: c.created_at,
                message_count: c.history.len(),
                is_current: i == self.current,
            })
            .collect()
    }

    fn index_of(&self, id: &str) -> Result<usize, DomainError> {
        self.chats
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| DomainError::agent_chat_not_found(id))
    }
}
