//! # treedist
//!
//! Edit distance between ordered labeled trees (Zhang & Shasha, 1989), with
//! pluggable operation costs and reconstruction of the edits behind the
//! number.
//!
//! ## Algorithm Overview
//!
//! 1. **Preprocessing**: number both trees in postorder, compute the
//!    leftmost descendant of every node and the keyroots.
//! 2. **Distance**: for every keyroot pair (ascending), fill a forest
//!    distance table; whole-subtree cells land in a shared `tree_dist` table
//!    that later forests reuse.
//! 3. **Reconstruction**: read a flat edit script back from the root forest,
//!    or walk subtree pairs to get an explicit node mapping.
//!
//! Costs come from a [`CostFunction`]: [`UnitCost`], or [`EditDistanceCost`]
//! measuring labels in words, characters, or bytes.
//!
//! ## Usage
//!
//! ```
//! use treedist::{Tree, TreeNode, UnitCost, compute_tree_dist};
//!
//! // f(d(a, c(b)), e) against f(c(d(a, b)), e)
//! let t1 = Tree::from_node(&TreeNode::new(
//!     "f",
//!     vec![
//!         TreeNode::new("d", vec![TreeNode::leaf("a"), TreeNode::new("c", vec![TreeNode::leaf("b")])]),
//!         TreeNode::leaf("e"),
//!     ],
//! ));
//! let t2 = Tree::from_node(&TreeNode::new(
//!     "f",
//!     vec![
//!         TreeNode::new("c", vec![TreeNode::new("d", vec![TreeNode::leaf("a"), TreeNode::leaf("b")])]),
//!         TreeNode::leaf("e"),
//!     ],
//! ));
//!
//! let result = compute_tree_dist(&t1, &t2, UnitCost).unwrap();
//! assert_eq!(result.distance(), 2.0);
//!
//! for op in result.edit_script() {
//!     println!("{op}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]

pub use indextree;

mod tracing_macros;

/// Per-operation cost functions
pub mod cost;
/// Forest and tree distance tables
pub mod distance;
mod error;
/// Levenshtein distance over bytes, characters, or words
pub mod levenshtein;
/// Explicit node mapping
pub mod mapping;
/// Postorder arrays
pub mod preprocess;
/// Flat edit scripts
pub mod script;
/// Depth-first walks
pub mod traversal;
/// Tree representation
pub mod tree;

pub use cost::{
    CostFunction, CostModel, EditDistanceCost, Operation, UnitCost, ZERO_COST_EPSILON,
};
pub use distance::{ForestDist, TreeDistance, compute_tree_dist, compute_tree_dist_by};
pub use error::TreeDistError;
pub use levenshtein::{Tokenization, edit_distance};
pub use mapping::{MappedPair, Mapping};
pub use preprocess::{PreparedTree, compute_keyroots, compute_leftmost_descendants};
pub use script::EditOp;
pub use traversal::{Visitor, postorder, preorder};
pub use tree::{NodeData, NodeField, Tree, TreeNode};

/// Compute just the distance between two trees, comparing labels.
///
/// # Example
///
/// ```
/// use treedist::{CostModel, Tree, TreeNode, tree_distance};
///
/// let a = Tree::from_node(&TreeNode::leaf("ip address 10.0.0.1"));
/// let b = Tree::from_node(&TreeNode::leaf("ip address 10.0.0.2"));
///
/// assert_eq!(tree_distance(&a, &b, CostModel::Unit).unwrap(), 1.0);
/// assert_eq!(tree_distance(&a, &b, CostModel::WordEditDistance).unwrap(), 1.0);
/// assert_eq!(tree_distance(&a, &b, CostModel::CharacterEditDistance).unwrap(), 1.0);
/// ```
pub fn tree_distance<C: CostFunction>(t1: &Tree, t2: &Tree, cost: C) -> Result<f64, TreeDistError> {
    Ok(compute_tree_dist(t1, t2, cost)?.distance())
}
