//! Agent chat service
//!
//! Thin layer over [`AgentChats`](agentic_domain::AgentChats) that publishes
//! a change event after every mutation.

use crate::ports::events::{EventBus, StateEvent};
use crate::workspace::Workspace;
use agentic_domain::{AgentChat, AgentChatSummary, DomainError, Message};
use tracing::info;

#[derive(Clone)]
pub struct AgentChatService {
    workspace: Workspace,
    events: EventBus,
}

impl AgentChatService {
    pub fn new(workspace: Workspace, events: EventBus) -> Self {
        Self { workspace, events }
    }

    fn changed(&self) {
        self.events.publish(StateEvent::AgentChatChanged);
    }

    /// Append to the current chat
    pub fn push(&self, message: Message) -> Message {
        let stored = self
            .workspace
            .write(|s| s.agent_chats.push(message).clone());
        self.changed();
        stored
    }

    /// Session generation to hand to [`push_if_generation`](Self::push_if_generation)
    pub fn generation(&self) -> u64 {
        self.workspace.read(|s| s.forest.generation())
    }

    /// Append to the current chat unless the session was replaced since
    /// `generation` was read. Returns whether the message was written.
    pub fn push_if_generation(&self, generation: u64, message: Message) -> bool {
        let written = self.workspace.write(|s| {
            if s.forest.generation() != generation {
                return false;
            }
            s.agent_chats.push(message);
            true
        });
        if written {
            self.changed();
        } else {
            info!("Discarding agent chat message: session changed while it was in flight");
        }
        written
    }

    pub fn current(&self) -> AgentChat {
        self.workspace.read(|s| s.agent_chats.current().clone())
    }

    pub fn history(&self) -> Vec<Message> {
        self.workspace.read(|s| s.agent_chats.history().to_vec())
    }

    /// Last `limit` messages of the current chat
    pub fn recent_history(&self, limit: usize) -> Vec<Message> {
        self.workspace.read(|s| {
            let history = s.agent_chats.history();
            history[history.len().saturating_sub(limit)..].to_vec()
        })
    }

    pub fn summaries(&self) -> Vec<AgentChatSummary> {
        self.workspace.read(|s| s.agent_chats.summaries())
    }

    pub fn create(&self, name: Option<String>) -> AgentChat {
        let chat = self.workspace.write(|s| s.agent_chats.create(name).clone());
        self.changed();
        chat
    }

    pub fn switch(&self, id: &str) -> Result<AgentChat, DomainError> {
        let chat = self
            .workspace
            .write(|s| s.agent_chats.switch(id).cloned())?;
        self.changed();
        Ok(chat)
    }

    pub fn rename(&self, id: &str, name: &str) -> Result<(), DomainError> {
        self.workspace.write(|s| s.agent_chats.rename(id, name))?;
        self.changed();
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.workspace.write(|s| s.agent_chats.delete(id))?;
        self.changed();
        Ok(())
    }

    pub fn clear_current(&self) {
        self.workspace.write(|s| s.agent_chats.clear_current());
        self.changed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentic_domain::Role;

    fn service() -> (AgentChatService, EventBus) {
        let events = EventBus::default();
        (AgentChatService::new(Workspace::new(), events.clone()), events)
    }

    #[tokio::test]
    async fn test_push_publishes_change() {
        let (service, events) = service();
        let mut rx = events.subscribe();
        service.push(Message::plain(Role::User, "hello"));
        assert_eq!(rx.recv().await.unwrap(), StateEvent::AgentChatChanged);
        assert_eq!(service.history().len(), 1);
    }

    #[test]
    fn test_push_after_session_switch_is_discarded() {
        let (service, _) = service();
        let generation = service.generation();
        service.workspace.replace(agentic_domain::SessionState::new());

        assert!(!service.push_if_generation(generation, Message::assistant("late")));
        assert!(service.history().is_empty());

        let generation = service.generation();
        assert!(service.push_if_generation(generation, Message::assistant("on time")));
        assert_eq!(service.history()[0].content, "on time");
    }

    #[test]
    fn test_recent_history_limit() {
        let (service, _) = service();
        for i in 0..5 {
            service.push(Message::plain(Role::User, format!("m{}", i)));
        }
        let recent = service.recent_history(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "m3");
        assert_eq!(service.recent_history(50).len(), 5);
    }

    #[test]
    fn test_delete_last_chat_keeps_one() {
        let (service, _) = service();
        service.push(Message::plain(Role::User, "hello"));
        let id = service.current().id;
        service.delete(&id).unwrap();
        assert_eq!(service.summaries().len(), 1);
        assert!(service.history().is_empty());
    }

    #[test]
    fn test_create_switch_rename() {
        let (service, _) = service();
        let first = service.current().id;
        let second = service.create(None);
        assert_eq!(service.current().id, second.id);
        service.switch(&first).unwrap();
        service.rename(&second.id, "Ideas").unwrap();
        let summaries = service.summaries();
        assert_eq!(summaries[1].name, "Ideas");
        assert!(summaries[0].is_current);
        assert!(service.switch("missing").is_err());
    }
}
