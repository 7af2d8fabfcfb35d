//! Conversation forest domain.
//!
//! - [`entities::ConversationNode`]: one transcript bound to one model
//! - [`forest::ConversationForest`]: the ordered node list, current pointer and branching rules
//! - [`tree::ConversationTree`]: derived parent/child hierarchy with collapse state
//! - [`distribution::distribute_models`]: round-robin model assignment
//! - [`lookup`]: resolving free-text references to nodes

pub mod distribution;
pub mod entities;
pub mod forest;
pub mod lookup;
pub mod tree;

pub use distribution::distribute_models;
pub use entities::{ConversationId, ConversationNode};
pub use forest::ConversationForest;
pub use lookup::{find_conversation, find_target_conversation};
pub use tree::{ConversationTree, ExpandState, TreeNode};
