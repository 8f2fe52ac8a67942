//! Per-comparison preprocessing: postorder positions, leftmost descendants,
//! and keyroots.
//!
//! Positions are 1-based and assigned fresh for every comparison; nothing is
//! written back onto the tree. Arrays in [`PreparedTree`] keep a sentinel at
//! index 0 so the engine can index them by position directly, with 0 meaning
//! "no node".

use indextree::NodeId;

use crate::error::TreeDistError;
use crate::traversal::{Visitor, postorder};
use crate::tree::{NodeField, Tree};
use crate::{debug, trace};

/// Visitor state for the single postorder pass.
struct PostorderWalk {
    /// Postorder position of each arena node, indexed by `usize::from(id)`.
    /// 0 means not yet visited.
    position_of: Vec<usize>,
    /// Node at each position (index 0 is position 1).
    nodes: Vec<NodeId>,
    /// Leftmost descendant of each position (index 0 is position 1).
    leftmost: Vec<usize>,
    error: Option<TreeDistError>,
}

impl PostorderWalk {
    fn new(tree: &Tree) -> Self {
        let capacity = tree.node_count();
        Self {
            position_of: vec![0; tree.arena_len() + 1],
            nodes: Vec::with_capacity(capacity),
            leftmost: Vec::with_capacity(capacity),
            error: None,
        }
    }

    fn run(tree: &Tree) -> Result<Self, TreeDistError> {
        let mut walk = Self::new(tree);
        postorder(tree, &mut walk);
        match walk.error.take() {
            Some(err) => Err(err),
            None => Ok(walk),
        }
    }
}

impl Visitor for PostorderWalk {
    fn visit(&mut self, tree: &Tree, id: NodeId) {
        if self.error.is_some() {
            return;
        }

        let position = self.nodes.len() + 1;
        self.nodes.push(id);
        self.position_of[usize::from(id)] = position;

        let leftmost = match tree.first_child(id) {
            None => position,
            Some(child) => match self.position_of[usize::from(child)] {
                0 => {
                    self.error = Some(TreeDistError::UnresolvedChild { position });
                    return;
                }
                child_position => self.leftmost[child_position - 1],
            },
        };
        self.leftmost.push(leftmost);
    }
}

/// Leftmost descendant of every node, by postorder position.
///
/// Element `k` belongs to the node at position `k + 1`, and holds a position.
/// A leaf is its own leftmost descendant; an internal node inherits the value
/// of its first child.
pub fn compute_leftmost_descendants(tree: &Tree) -> Result<Vec<usize>, TreeDistError> {
    Ok(PostorderWalk::run(tree)?.leftmost)
}

/// Keyroots of a tree given its leftmost-descendant array.
///
/// For every distinct leftmost-descendant value, the highest position having
/// it; sorted ascending. `leftmost` uses the layout returned by
/// [`compute_leftmost_descendants`]. The root (the last position) is always a
/// keyroot of a non-empty tree.
pub fn compute_keyroots(leftmost: &[usize]) -> Vec<usize> {
    // highest[v] = highest position whose leftmost descendant is v
    let mut highest = vec![0; leftmost.len() + 1];
    for (index, &l) in leftmost.iter().enumerate() {
        highest[l] = index + 1;
    }
    let mut keyroots: Vec<usize> = highest.into_iter().filter(|&p| p != 0).collect();
    keyroots.sort_unstable();
    keyroots
}

/// A tree flattened for one comparison.
#[derive(Debug, Clone)]
pub struct PreparedTree<'a> {
    tree: &'a Tree,
    position_of: Vec<usize>,
    nodes: Vec<NodeId>,
    /// Compared value per position; `values[0]` is the "no node" sentinel.
    values: Vec<Option<&'a str>>,
    /// Leftmost descendant per position; `leftmost[0]` is unused.
    leftmost: Vec<usize>,
    keyroots: Vec<usize>,
}

impl<'a> PreparedTree<'a> {
    /// Validate `tree` and compute its postorder arrays, reading the compared
    /// value from `field`.
    pub fn new(tree: &'a Tree, field: NodeField) -> Result<Self, TreeDistError> {
        tree.validate()?;
        let walk = PostorderWalk::run(tree)?;

        let mut values = Vec::with_capacity(walk.nodes.len() + 1);
        values.push(None);
        values.extend(walk.nodes.iter().map(|&id| field.value(tree.get(id))));

        let keyroots = compute_keyroots(&walk.leftmost);

        let mut leftmost = Vec::with_capacity(walk.leftmost.len() + 1);
        leftmost.push(0);
        leftmost.extend_from_slice(&walk.leftmost);

        debug!(
            nodes = walk.nodes.len(),
            keyroots = keyroots.len(),
            "prepared tree"
        );
        trace!(?leftmost, ?keyroots, "postorder arrays");

        Ok(Self {
            tree,
            position_of: walk.position_of,
            nodes: walk.nodes,
            values,
            leftmost,
            keyroots,
        })
    }

    /// The underlying tree.
    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at a postorder position.
    pub fn node(&self, position: usize) -> Option<NodeId> {
        position.checked_sub(1).and_then(|k| self.nodes.get(k).copied())
    }

    /// Postorder position of a node, if it belongs to the tree.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        match self.position_of.get(usize::from(id)) {
            Some(&0) | None => None,
            Some(&position) => Some(position),
        }
    }

    /// Compared value at a position (`None` for position 0).
    #[inline]
    pub fn value(&self, position: usize) -> Option<&'a str> {
        self.values[position]
    }

    /// Leftmost descendant of a position.
    #[inline]
    pub fn leftmost(&self, position: usize) -> usize {
        self.leftmost[position]
    }

    /// Leftmost descendants of positions `1..=n`.
    pub fn leftmost_descendants(&self) -> &[usize] {
        &self.leftmost[1..]
    }

    /// Keyroots, ascending.
    pub fn keyroots(&self) -> &[usize] {
        &self.keyroots
    }
}
