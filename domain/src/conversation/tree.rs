//! Derived conversation hierarchy
//!
//! [`ConversationTree`] is rebuilt from the flat node list whenever it is
//! needed and is never persisted. Only [`ExpandState`] survives between
//! renders.

use super::entities::{ConversationId, ConversationNode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Set of conversation ids whose children are shown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpandState {
    expanded: BTreeSet<ConversationId>,
}

impl ExpandState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids(ids: impl IntoIterator<Item = ConversationId>) -> Self {
        Self {
            expanded: ids.into_iter().collect(),
        }
    }

    pub fn ids(&self) -> Vec<ConversationId> {
        self.expanded.iter().cloned().collect()
    }

    pub fn is_expanded(&self, id: &ConversationId) -> bool {
        self.expanded.contains(id)
    }

    /// Flip one node; returns the new state
    pub fn toggle(&mut self, id: &ConversationId) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.clone());
            true
        }
    }

    pub fn set(&mut self, id: &ConversationId, expanded: bool) {
        if expanded {
            self.expanded.insert(id.clone());
        } else {
            self.expanded.remove(id);
        }
    }

    pub fn reset(&mut self) {
        self.expanded.clear();
    }

    /// Expand every strict ancestor of `id` so the node becomes visible.
    /// The node itself keeps its state.
    pub fn expand_path_to(&mut self, id: &ConversationId, nodes: &[ConversationNode]) {
        let by_id: HashMap<&ConversationId, &ConversationNode> =
            nodes.iter().map(|n| (&n.id, n)).collect();
        let mut cursor = by_id.get(id).and_then(|n| n.parent_id.as_ref());
        let mut steps = 0;
        while let Some(parent_id) = cursor {
            let Some(parent) = by_id.get(parent_id) else {
                break;
            };
            self.expanded.insert(parent_id.clone());
            steps += 1;
            if steps > nodes.len() {
                break;
            }
            cursor = parent.parent_id.as_ref();
        }
    }
}

/// A node decorated with its position in the hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<'a> {
    pub node: &'a ConversationNode,
    pub children: Vec<TreeNode<'a>>,
    pub depth: usize,
    pub is_expanded: bool,
    /// Dotted position label such as `1.2.1`
    pub label: String,
}

impl TreeNode<'_> {
    pub fn id(&self) -> &ConversationId {
        &self.node.id
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of descendants at any depth
    pub fn branch_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.branch_count())
            .sum()
    }
}

/// Parent/child view over the forest
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTree<'a> {
    pub roots: Vec<TreeNode<'a>>,
}

impl<'a> ConversationTree<'a> {
    /// Build the hierarchy.
    ///
    /// Nodes whose parent id does not resolve are promoted to roots. Roots keep
    /// forest order; siblings are ordered by creation sequence. Nodes caught in
    /// a parent cycle are also promoted so that nothing is lost.
    pub fn build(nodes: &'a [ConversationNode], expand: &ExpandState) -> Self {
        let index: HashMap<&ConversationId, usize> =
            nodes.iter().enumerate().map(|(i, n)| (&n.id, i)).collect();

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        let mut root_indices = Vec::new();
        for (i, node) in nodes.iter().enumerate() {
            match node.parent_id.as_ref().and_then(|p| index.get(p)) {
                Some(&parent) if parent != i => children[parent].push(i),
                _ => root_indices.push(i),
            }
        }
        for list in &mut children {
            list.sort_by_key(|&i| nodes[i].seq);
        }

        let mut visited = vec![false; nodes.len()];
        let mut roots = Vec::new();
        for &i in &root_indices {
            let label = (roots.len() + 1).to_string();
            roots.push(build_node(nodes, &children, expand, &mut visited, i, 0, label));
        }
        for i in 0..nodes.len() {
            if !visited[i] {
                let label = (roots.len() + 1).to_string();
                roots.push(build_node(nodes, &children, expand, &mut visited, i, 0, label));
            }
        }

        Self { roots }
    }

    /// Pre-order list of nodes reachable through expanded parents
    pub fn visible_nodes(&self) -> Vec<&TreeNode<'a>> {
        fn walk<'t, 'a>(node: &'t TreeNode<'a>, out: &mut Vec<&'t TreeNode<'a>>) {
            out.push(node);
            if node.is_expanded {
                for child in &node.children {
                    walk(child, out);
                }
            }
        }
        let mut out = Vec::new();
        for root in &self.roots {
            walk(root, &mut out);
        }
        out
    }

    /// Pre-order list of every node regardless of collapse state
    pub fn all_nodes(&self) -> Vec<&TreeNode<'a>> {
        fn walk<'t, 'a>(node: &'t TreeNode<'a>, out: &mut Vec<&'t TreeNode<'a>>) {
            out.push(node);
            for child in &node.children {
                walk(child, out);
            }
        }
        let mut out = Vec::new();
        for root in &self.roots {
            walk(root, &mut out);
        }
        out
    }

    pub fn find(&self, id: &ConversationId) -> Option<&TreeNode<'a>> {
        self.all_nodes().into_iter().find(|n| n.id() == id)
    }

    /// Dotted label for a node, if it is in the tree
    pub fn label_for(&self, id: &ConversationId) -> Option<&str> {
        self.find(id).map(|n| n.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.all_nodes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

fn build_node<'a>(
    nodes: &'a [ConversationNode],
    children: &[Vec<usize>],
    expand: &ExpandState,
    visited: &mut [bool],
    index: usize,
    depth: usize,
    label: String,
) -> TreeNode<'a> {
    visited[index] = true;
    let node = &nodes[index];
    let mut built = Vec::new();
    for &child in &children[index] {
        if visited[child] {
            continue;
        }
        let child_label = format!("{}.{}", label, built.len() + 1);
        built.push(build_node(
            nodes,
            children,
            expand,
            visited,
            child,
            depth + 1,
            child_label,
        ));
    }
    TreeNode {
        node,
        children: built,
        depth,
        is_expanded: expand.is_expanded(&node.id),
        label,
    }
}
