//! Depth-first walks over a [`Tree`].
//!
//! Walks are iterative (driven by indextree's edge traversal), so very deep
//! trees do not grow the call stack. State is carried by the visitor itself,
//! passed by mutable reference.

use indextree::{NodeEdge, NodeId};

use crate::tree::Tree;

/// Callback invoked once per node during a walk.
///
/// Implemented for any `FnMut(&Tree, NodeId)`, so closures can be used where a
/// dedicated state struct would be overkill.
pub trait Visitor {
    /// Visit one node.
    fn visit(&mut self, tree: &Tree, id: NodeId);
}

impl<F> Visitor for F
where
    F: FnMut(&Tree, NodeId),
{
    fn visit(&mut self, tree: &Tree, id: NodeId) {
        self(tree, id)
    }
}

/// Visit every node after all of its children (children left to right).
pub fn postorder<V: Visitor + ?Sized>(tree: &Tree, visitor: &mut V) {
    for edge in tree.traverse() {
        if let NodeEdge::End(id) = edge {
            visitor.visit(tree, id);
        }
    }
}

/// Visit every node before any of its children (children left to right).
pub fn preorder<V: Visitor + ?Sized>(tree: &Tree, visitor: &mut V) {
    for edge in tree.traverse() {
        if let NodeEdge::Start(id) = edge {
            visitor.visit(tree, id);
        }
    }
}

/// Node ids in postorder. Index `k` holds the node at postorder position `k + 1`.
pub fn postorder_ids(tree: &Tree) -> Vec<NodeId> {
    let mut ids = Vec::with_capacity(tree.node_count());
    postorder(tree, &mut |_: &Tree, id: NodeId| ids.push(id));
    ids
}

/// Node ids in preorder.
pub fn preorder_ids(tree: &Tree) -> Vec<NodeId> {
    let mut ids = Vec::with_capacity(tree.node_count());
    preorder(tree, &mut |_: &Tree, id: NodeId| ids.push(id));
    ids
}
