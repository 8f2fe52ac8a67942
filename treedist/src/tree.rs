//! Ordered labeled trees.
//!
//! [`TreeNode`] is the owned, recursive shape handed over by whatever parsed
//! the document. [`Tree`] is the arena form the engine works on: nodes live in
//! an [`indextree::Arena`] and children keep their insertion order.

use core::fmt;
use core::str::FromStr;

use facet::Facet;
use indextree::{Arena, NodeEdge, NodeId};

use crate::error::TreeDistError;

/// A node of a canonical parse tree.
///
/// Children are in document order; that order is significant and is never
/// changed by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct TreeNode {
    /// Free text compared by the cost functions.
    #[facet(default)]
    pub label: Option<String>,

    /// Production / node type, used for reporting (or compared instead of the
    /// label when [`NodeField::Kind`] is selected).
    #[facet(default, rename = "type")]
    pub kind: Option<String>,

    /// Child nodes, in order.
    #[facet(default)]
    #[facet(recursive_type)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// A labeled node with the given children.
    pub fn new(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            label: Some(label.into()),
            kind: None,
            children,
        }
    }

    /// A labeled node without children.
    pub fn leaf(label: impl Into<String>) -> Self {
        Self::new(label, Vec::new())
    }

    /// Set the node type.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Number of nodes in this subtree (including self).
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

/// Data stored at each arena node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeData {
    /// Node label.
    pub label: Option<String>,
    /// Node type.
    pub kind: Option<String>,
}

impl NodeData {
    /// Node data with just a label.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            kind: None,
        }
    }

    fn from_node(node: &TreeNode) -> Self {
        Self {
            label: node.label.clone(),
            kind: node.kind.clone(),
        }
    }
}

/// Which node field the cost functions compare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum NodeField {
    /// The node label.
    #[default]
    Label,
    /// The node type.
    Kind,
}

impl NodeField {
    /// Get the selected field of a node.
    pub fn value<'a>(self, data: &'a NodeData) -> Option<&'a str> {
        match self {
            NodeField::Label => data.label.as_deref(),
            NodeField::Kind => data.kind.as_deref(),
        }
    }

    /// The configuration name of this field.
    pub fn name(self) -> &'static str {
        match self {
            NodeField::Label => "label",
            NodeField::Kind => "type",
        }
    }
}

impl FromStr for NodeField {
    type Err = TreeDistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "label" => Ok(NodeField::Label),
            "type" | "kind" => Ok(NodeField::Kind),
            other => Err(TreeDistError::UnknownField {
                name: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for NodeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An ordered tree stored in an arena.
///
/// A tree may be empty (no root). Nodes created with [`Tree::new_detached`]
/// and never attached make the tree invalid; [`Tree::validate`] reports them.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    arena: Arena<NodeData>,
    root: Option<NodeId>,
}

impl Tree {
    /// The tree with no nodes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A tree consisting of a single root node.
    pub fn new(root: NodeData) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(root);
        Self {
            arena,
            root: Some(root),
        }
    }

    /// Build the arena form of a canonical tree.
    pub fn from_node(node: &TreeNode) -> Self {
        let mut tree = Tree::new(NodeData::from_node(node));
        let Some(root) = tree.root else {
            return tree;
        };

        let mut stack: Vec<(&TreeNode, NodeId)> = vec![(node, root)];
        while let Some((node, id)) = stack.pop() {
            for child in &node.children {
                let child_id = tree.add_child(id, NodeData::from_node(child));
                stack.push((child, child_id));
            }
        }
        tree
    }

    /// Convert back into the owned canonical form. Returns `None` for the
    /// empty tree.
    pub fn to_node(&self) -> Option<TreeNode> {
        let root = self.root?;
        Some(self.node_at(root))
    }

    fn node_at(&self, id: NodeId) -> TreeNode {
        // Postorder: every child is finished before its parent is popped.
        let mut finished: Vec<TreeNode> = Vec::new();
        for edge in id.traverse(&self.arena) {
            if let NodeEdge::End(id) = edge {
                let child_count = self.child_count(id);
                let children = finished.split_off(finished.len() - child_count);
                let data = self.get(id);
                finished.push(TreeNode {
                    label: data.label.clone(),
                    kind: data.kind.clone(),
                    children,
                });
            }
        }
        finished.pop().unwrap_or_default()
    }

    /// Copy the subtree rooted at `id` into a new tree.
    pub fn subtree(&self, id: NodeId) -> Tree {
        Tree::from_node(&self.node_at(id))
    }

    /// The root node, if the tree is not empty.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Append a new node as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let child = self.arena.new_node(data);
        parent.append(child, &mut self.arena);
        child
    }

    /// Create a node that is not yet part of the tree. Attach it with
    /// [`Tree::attach`].
    pub fn new_detached(&mut self, data: NodeData) -> NodeId {
        self.arena.new_node(data)
    }

    /// Append an existing node (and its subtree) as the last child of
    /// `parent`.
    ///
    /// Fails if the attach would create a cycle (attaching a node under itself
    /// or under one of its descendants) or if either node was removed.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeDistError> {
        parent
            .checked_append(child, &mut self.arena)
            .map_err(|err| TreeDistError::AttachFailed {
                parent: usize::from(parent),
                child: usize::from(child),
                reason: err.to_string(),
            })
    }

    /// Data of a node.
    pub fn get(&self, id: NodeId) -> &NodeData {
        self.arena[id].get()
    }

    /// Children of a node, in order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    /// First child of a node.
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].first_child()
    }

    /// Number of children of a node.
    pub fn child_count(&self, id: NodeId) -> usize {
        id.children(&self.arena).count()
    }

    /// Parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].parent()
    }

    /// Number of nodes reachable from the root.
    pub fn node_count(&self) -> usize {
        self.root
            .map_or(0, |root| root.descendants(&self.arena).count())
    }

    /// Upper bound (inclusive) of `usize::from(id)` for ids of this arena.
    pub(crate) fn arena_len(&self) -> usize {
        self.arena.count()
    }

    /// Iterate the edges of a depth-first walk from the root.
    pub(crate) fn traverse(&self) -> impl Iterator<Item = NodeEdge> + '_ {
        self.root
            .into_iter()
            .flat_map(move |root| root.traverse(&self.arena))
    }

    /// Check that every live node of the arena hangs off the root.
    pub fn validate(&self) -> Result<(), TreeDistError> {
        for node in self.arena.iter().filter(|node| !node.is_removed()) {
            let Some(id) = self.arena.get_node_id(node) else {
                continue;
            };
            let top = id.ancestors(&self.arena).last();
            if top != self.root {
                return Err(TreeDistError::DetachedNode {
                    node: usize::from(id),
                });
            }
        }
        Ok(())
    }
}

impl From<&TreeNode> for Tree {
    fn from(node: &TreeNode) -> Self {
        Tree::from_node(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    fn sample() -> TreeNode {
        // f(d(a, c(b)), e)
        TreeNode::new(
            "f",
            vec![
                TreeNode::new(
                    "d",
                    vec![TreeNode::leaf("a"), TreeNode::new("c", vec![TreeNode::leaf("b")])],
                ),
                TreeNode::leaf("e"),
            ],
        )
    }

    #[test]
    fn test_from_node_keeps_child_order() {
        let tree = Tree::from_node(&sample());
        let root = tree.root().unwrap();
        assert_eq!(tree.get(root).label.as_deref(), Some("f"));

        let labels: Vec<_> = tree
            .children(root)
            .map(|id| tree.get(id).label.clone().unwrap())
            .collect();
        assert_eq!(labels, ["d", "e"]);
        assert_eq!(tree.node_count(), 6);
    }

    #[test]
    fn test_to_node_roundtrip() {
        let node = sample();
        let tree = Tree::from_node(&node);
        assert_eq!(tree.to_node(), Some(node));
        assert_eq!(Tree::empty().to_node(), None);
    }

    #[test]
    fn test_subtree_copy() {
        let tree = Tree::from_node(&sample());
        let root = tree.root().unwrap();
        let d = tree.first_child(root).unwrap();
        let sub = tree.subtree(d);
        assert_eq!(sub.node_count(), 4);
        assert_eq!(sub.get(sub.root().unwrap()).label.as_deref(), Some("d"));
    }

    #[test]
    fn test_attach_rejects_cycle() {
        let mut tree = Tree::new(NodeData::labeled("root"));
        let root = tree.root().unwrap();
        let child = tree.add_child(root, NodeData::labeled("child"));

        let err = tree.attach(child, root).unwrap_err();
        assert!(matches!(err, TreeDistError::AttachFailed { .. }));

        let err = tree.attach(child, child).unwrap_err();
        assert!(matches!(err, TreeDistError::AttachFailed { .. }));
    }

    #[test]
    fn test_validate_reports_detached_node() {
        let mut tree = Tree::new(NodeData::labeled("root"));
        let root = tree.root().unwrap();
        tree.add_child(root, NodeData::labeled("a"));
        assert!(tree.validate().is_ok());

        let orphan = tree.new_detached(NodeData::labeled("orphan"));
        assert_eq!(
            tree.validate(),
            Err(TreeDistError::DetachedNode {
                node: usize::from(orphan)
            })
        );

        tree.attach(root, orphan).unwrap();
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_node_field_names() {
        assert_eq!("label".parse::<NodeField>(), Ok(NodeField::Label));
        assert_eq!("type".parse::<NodeField>(), Ok(NodeField::Kind));
        assert!(matches!(
            "colour".parse::<NodeField>(),
            Err(TreeDistError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_deep_tree_does_not_recurse() {
        let mut node = TreeNode::leaf("leaf");
        for depth in 0..50_000 {
            node = TreeNode::new(format!("n{depth}"), vec![node]);
        }
        let tree = Tree::from_node(&node);
        assert_eq!(tree.node_count(), 50_001);
        // Recursive Drop of TreeNode would overflow; tear it down iteratively.
        let mut stack = vec![node];
        while let Some(mut n) = stack.pop() {
            stack.append(&mut n.children);
        }
    }
}
