//! Conversation entities

use crate::core::message::Message;
use crate::core::model::ModelBinding;
use serde::{Deserialize, Serialize};

/// Opaque conversation identifier.
///
/// Identity only: ordering between nodes uses [`ConversationNode::seq`], never
/// the id text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One model conversation (Entity)
///
/// The model binding is fixed at creation. `history` only grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationNode {
    pub id: ConversationId,
    /// Creation order within the session; 0 means "not yet assigned" (legacy data).
    #[serde(default)]
    pub seq: u64,
    pub model_id: String,
    pub model_name: String,
    #[serde(default)]
    pub parent_id: Option<ConversationId>,
    /// Parent history length at the moment this node branched off.
    #[serde(default)]
    pub branch_point: Option<usize>,
    #[serde(default)]
    pub history: Vec<Message>,
}

impl ConversationNode {
    pub fn model(&self) -> ModelBinding {
        ModelBinding::new(&self.model_id, &self.model_name)
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// First user-role message, the node's title in listings
    pub fn first_prompt(&self) -> Option<&str> {
        self.history
            .iter()
            .find(|m| m.role == crate::core::message::Role::User)
            .map(|m| m.content.as_str())
    }

    /// Most recent assistant reply, if any
    pub fn last_reply(&self) -> Option<&Message> {
        self.history
            .iter()
            .rev()
            .find(|m| m.role == crate::core::message::Role::Assistant)
    }

    /// True while the last entry is an unanswered user turn
    pub fn is_pending(&self) -> bool {
        self.history
            .last()
            .is_some_and(|m| m.role == crate::core::message::Role::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::MessageSource;

    #[test]
    fn test_legacy_json_without_seq() {
        let json = r#"{
            "id": "3",
            "modelId": "openai/gpt-5.1",
            "modelName": "GPT-5.1",
            "parentId": null,
            "branchPoint": null,
            "history": [{"role": "user", "content": "hi", "timestamp": 1, "source": "agent"}]
        }"#;
        let node: ConversationNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.id.as_str(), "3");
        assert_eq!(node.seq, 0);
        assert!(node.is_root());
        assert_eq!(node.history[0].source, Some(MessageSource::Agent));
        assert!(node.is_pending());
    }

    #[test]
    fn test_first_prompt_and_last_reply() {
        let node = ConversationNode {
            id: "1".into(),
            seq: 1,
            model_id: "m".to_string(),
            model_name: "M".to_string(),
            parent_id: None,
            branch_point: None,
            history: vec![
                Message::user("tell a joke", MessageSource::Agent),
                Message::assistant("knock knock"),
            ],
        };
        assert_eq!(node.first_prompt(), Some("tell a joke"));
        assert_eq!(node.last_reply().unwrap().content, "knock knock");
        assert!(!node.is_pending());
    }
}
