//! Services a command needs, bundled once by the binary

use agentic_application::{
    AgentChatService, ConveneCouncilUseCase, ConversationStore, HandleAgentMessageUseCase,
    ModelTransport, Preferences, SessionManager, Workspace,
};
use agentic_domain::{
    ConversationId, ConversationTree, find_conversation, find_target_conversation,
};
use std::sync::Arc;

pub struct ChatContext<T: ModelTransport + 'static> {
    pub conversations: ConversationStore<T>,
    pub agent: HandleAgentMessageUseCase<T>,
    pub council: ConveneCouncilUseCase<T>,
    pub agent_chats: AgentChatService,
    pub sessions: Arc<SessionManager>,
    pub preferences: Preferences,
}

impl<T: ModelTransport + 'static> ChatContext<T> {
    pub fn workspace(&self) -> &Workspace {
        self.conversations.workspace()
    }

    /// Resolve what a user typed to a conversation id.
    ///
    /// Tries a dotted tree label (`1.2`), an exact id, the orchestrator's
    /// rules (model name, then position), and finally a model id substring.
    pub fn resolve_conversation(&self, term: &str) -> Option<ConversationId> {
        resolve_conversation(self.workspace(), term)
    }

    /// Dotted tree label of a conversation
    pub fn label_of(&self, id: &ConversationId) -> Option<String> {
        label_of(self.workspace(), id)
    }
}

pub fn resolve_conversation(workspace: &Workspace, term: &str) -> Option<ConversationId> {
    let term = term.trim();
    workspace.read(|s| {
        let nodes = s.forest.nodes();
        let tree = ConversationTree::build(nodes, &s.expand);
        if let Some(row) = tree.all_nodes().into_iter().find(|r| r.label == term) {
            return Some(row.id().clone());
        }
        if let Some(node) = nodes.iter().find(|n| n.id.as_str() == term) {
            return Some(node.id.clone());
        }
        find_target_conversation(term, nodes)
            .or_else(|| find_conversation(term, nodes))
            .map(|n| n.id.clone())
    })
}

pub fn label_of(workspace: &Workspace, id: &ConversationId) -> Option<String> {
    workspace.read(|s| {
        ConversationTree::build(s.forest.nodes(), &s.expand)
            .label_for(id)
            .map(str::to_string)
    })
}
