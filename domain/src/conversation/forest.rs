//! Conversation forest aggregate
//!
//! The forest is the ordered list of every [`ConversationNode`] in the active
//! session together with the "current" pointer. Creation and branching append
//! synchronously; replies are written back through
//! [`ConversationForest::append_if_generation`] so that completions from a
//! replaced forest are dropped instead of landing in the wrong session.

use super::entities::{ConversationId, ConversationNode};
use crate::core::error::DomainError;
use crate::core::message::{Message, MessageSource};
use crate::core::model::ModelBinding;

#[derive(Debug, Clone, Default)]
pub struct ConversationForest {
    nodes: Vec<ConversationNode>,
    current: Option<usize>,
    next_seq: u64,
    generation: u64,
}

impl ConversationForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a forest from persisted nodes.
    ///
    /// Nodes saved before sequence numbers existed get one assigned from their
    /// numeric id when possible, otherwise from their position. The current
    /// index is clamped into range.
    pub fn restore(mut nodes: Vec<ConversationNode>, current_index: usize) -> Self {
        let mut next_seq = nodes.iter().map(|n| n.seq).max().unwrap_or(0);
        for node in nodes.iter_mut().filter(|n| n.seq == 0) {
            node.seq = match node.id.as_str().parse::<u64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    next_seq += 1;
                    next_seq
                }
            };
        }
        let max_seq = nodes.iter().map(|n| n.seq).max().unwrap_or(0);
        let current = if nodes.is_empty() {
            None
        } else {
            Some(current_index.min(nodes.len() - 1))
        };
        Self {
            nodes,
            current,
            next_seq: max_seq,
            generation: 0,
        }
    }

    pub fn nodes(&self) -> &[ConversationNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Position of the current node, 0 when the forest is empty
    pub fn current_index(&self) -> usize {
        self.current.unwrap_or(0)
    }

    pub fn current(&self) -> Option<&ConversationNode> {
        self.current.and_then(|i| self.nodes.get(i))
    }

    pub fn get(&self, id: &ConversationId) -> Option<&ConversationNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn position(&self, id: &ConversationId) -> Option<usize> {
        self.nodes.iter().position(|n| &n.id == id)
    }

    /// Point the current index at `id`
    pub fn select(&mut self, id: &ConversationId) -> Result<&ConversationNode, DomainError> {
        let index = self
            .position(id)
            .ok_or_else(|| DomainError::conversation_not_found(id.as_str()))?;
        self.current = Some(index);
        Ok(&self.nodes[index])
    }

    /// Advance circularly; `None` on an empty forest
    pub fn next(&mut self) -> Option<&ConversationNode> {
        let len = self.nodes.len();
        if len == 0 {
            return None;
        }
        let index = (self.current_index() + 1) % len;
        self.current = Some(index);
        self.nodes.get(index)
    }

    /// Retreat circularly; `None` on an empty forest
    pub fn previous(&mut self) -> Option<&ConversationNode> {
        let len = self.nodes.len();
        if len == 0 {
            return None;
        }
        let index = (self.current_index() + len - 1) % len;
        self.current = Some(index);
        self.nodes.get(index)
    }

    /// Counter identifying this forest instance for in-flight writers
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace every node, invalidating all in-flight completions
    pub fn replace(&mut self, other: ConversationForest) {
        let generation = self.generation + 1;
        *self = other;
        self.generation = generation;
    }

    /// Drop all nodes, invalidating all in-flight completions
    pub fn clear(&mut self) {
        self.replace(ConversationForest::new());
    }

    fn allocate_id(&mut self) -> (ConversationId, u64) {
        loop {
            self.next_seq += 1;
            let id = ConversationId::new(self.next_seq.to_string());
            if self.get(&id).is_none() {
                return (id, self.next_seq);
            }
        }
    }

    /// Append one root node per binding, each holding exactly the initial
    /// prompt. The current index moves to the first new node. An empty
    /// binding list creates nothing.
    pub fn create_roots(&mut self, bindings: &[ModelBinding], prompt: &str) -> Vec<ConversationId> {
        let first = self.nodes.len();
        let mut created = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let (id, seq) = self.allocate_id();
            self.nodes.push(ConversationNode {
                id: id.clone(),
                seq,
                model_id: binding.id.clone(),
                model_name: binding.name.clone(),
                parent_id: None,
                branch_point: None,
                history: vec![Message::user(prompt, MessageSource::Agent)],
            });
            created.push(id);
        }
        if !created.is_empty() {
            self.current = Some(first);
        }
        created
    }

    /// Append `count` branches of `parent_id`.
    ///
    /// Branch `i` uses `prompts[i]`, falling back to `prompts[0]` when the
    /// caller supplied fewer prompts than branches. Every branch gets its own
    /// copy of the parent's history as it is right now. The current index is
    /// left untouched.
    pub fn create_branches(
        &mut self,
        parent_id: &ConversationId,
        count: usize,
        prompts: &[String],
        source: MessageSource,
    ) -> Result<Vec<ConversationId>, DomainError> {
        let parent = self
            .get(parent_id)
            .ok_or_else(|| DomainError::conversation_not_found(parent_id.as_str()))?;
        let snapshot = parent.history.clone();
        let model = parent.model();

        let mut created = Vec::with_capacity(count);
        for i in 0..count {
            let prompt = prompts
                .get(i)
                .or_else(|| prompts.first())
                .cloned()
                .unwrap_or_default();
            let mut history = snapshot.clone();
            history.push(Message::user(prompt, source));

            let (id, seq) = self.allocate_id();
            self.nodes.push(ConversationNode {
                id: id.clone(),
                seq,
                model_id: model.id.clone(),
                model_name: model.name.clone(),
                parent_id: Some(parent_id.clone()),
                branch_point: Some(snapshot.len()),
                history,
            });
            created.push(id);
        }
        Ok(created)
    }

    /// Append a message to a node
    pub fn append(&mut self, id: &ConversationId, message: Message) -> Result<(), DomainError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| DomainError::conversation_not_found(id.as_str()))?;
        node.history.push(message);
        Ok(())
    }

    /// Append a message only if the forest has not been replaced since
    /// `generation` was read. Returns whether the message was written.
    pub fn append_if_generation(
        &mut self,
        generation: u64,
        id: &ConversationId,
        message: Message,
    ) -> bool {
        generation == self.generation && self.append(id, message).is_ok()
    }

    pub fn roots(&self) -> impl Iterator<Item = &ConversationNode> {
        self.nodes.iter().filter(|n| n.is_root())
    }

    pub fn children<'a>(
        &'a self,
        id: &'a ConversationId,
    ) -> impl Iterator<Item = &'a ConversationNode> + 'a {
        self.nodes
            .iter()
            .filter(move |n| n.parent_id.as_ref() == Some(id))
    }

    /// Number of ancestors; unresolved parents end the walk
    pub fn depth(&self, id: &ConversationId) -> usize {
        let mut depth = 0;
        let mut cursor = self.get(id).and_then(|n| n.parent_id.as_ref());
        while let Some(parent_id) = cursor {
            let Some(parent) = self.get(parent_id) else {
                break;
            };
            depth += 1;
            if depth > self.nodes.len() {
                break;
            }
            cursor = parent.parent_id.as_ref();
        }
        depth
    }
}
