//! Flat edit scripts.
//!
//! A script is read back from the operation table of the root forest,
//! starting at the last postorder position of each tree. Deletions come
//! first, then updates, then insertions; within each group entries appear in
//! the order they were backtracked.

use core::fmt;

use facet::Facet;

use crate::cost::{CostFunction, Operation};
use crate::distance::TreeDistance;
use crate::trace;

/// One step of an edit script. Positions are postorder positions (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Facet)]
#[repr(u8)]
pub enum EditOp {
    /// Align node `t1` of the first tree with node `t2` of the second.
    Update {
        /// Position in the first tree.
        t1: usize,
        /// Position in the second tree.
        t2: usize,
        /// Forest distance at the backtracked cell.
        forest_distance: f64,
        /// Cost of this update.
        cost: f64,
    },
    /// Remove node `t1` of the first tree.
    Delete {
        /// Position in the first tree.
        t1: usize,
        /// Forest distance at the backtracked cell.
        forest_distance: f64,
        /// Cost of this deletion.
        cost: f64,
    },
    /// Add node `t2` of the second tree.
    Insert {
        /// Position in the second tree.
        t2: usize,
        /// Forest distance at the backtracked cell.
        forest_distance: f64,
        /// Cost of this insertion.
        cost: f64,
    },
}

impl EditOp {
    /// The kind of operation.
    pub fn operation(&self) -> Operation {
        match self {
            EditOp::Update { .. } => Operation::Update,
            EditOp::Delete { .. } => Operation::Delete,
            EditOp::Insert { .. } => Operation::Insert,
        }
    }

    /// Position in the first tree, if this step touches it.
    pub fn t1(&self) -> Option<usize> {
        match *self {
            EditOp::Update { t1, .. } | EditOp::Delete { t1, .. } => Some(t1),
            EditOp::Insert { .. } => None,
        }
    }

    /// Position in the second tree, if this step touches it.
    pub fn t2(&self) -> Option<usize> {
        match *self {
            EditOp::Update { t2, .. } | EditOp::Insert { t2, .. } => Some(t2),
            EditOp::Delete { .. } => None,
        }
    }

    /// Forest distance at the cell this step was read from.
    pub fn forest_distance(&self) -> f64 {
        match *self {
            EditOp::Update {
                forest_distance, ..
            }
            | EditOp::Delete {
                forest_distance, ..
            }
            | EditOp::Insert {
                forest_distance, ..
            } => forest_distance,
        }
    }

    /// Cost of this step alone.
    pub fn cost(&self) -> f64 {
        match *self {
            EditOp::Update { cost, .. }
            | EditOp::Delete { cost, .. }
            | EditOp::Insert { cost, .. } => cost,
        }
    }
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            EditOp::Update {
                t1,
                t2,
                forest_distance,
                cost,
            } => write!(f, "UPDATE ({forest_distance}, {cost}) T1[{t1}] -> T2[{t2}]"),
            EditOp::Delete {
                t1,
                forest_distance,
                cost,
            } => write!(f, "DELETE ({forest_distance}, {cost}) T1[{t1}]"),
            EditOp::Insert {
                t2,
                forest_distance,
                cost,
            } => write!(f, "INSERT ({forest_distance}, {cost}) T2[{t2}]"),
        }
    }
}

impl<C: CostFunction> TreeDistance<'_, C> {
    /// Reconstruct the flat edit script.
    ///
    /// When one side is exhausted before the other, the remaining nodes are
    /// read from the base row or column of the root forest: pure insertions
    /// or pure deletions.
    pub fn edit_script(&self) -> Vec<EditOp> {
        let (n1, n2) = (self.t1().len(), self.t2().len());
        let (Some(forest), Some(tables)) = (self.root_forest.as_ref(), self.tables.as_ref())
        else {
            return self.degenerate_script();
        };

        let mut deletes = Vec::new();
        let mut updates = Vec::new();
        let mut inserts = Vec::new();

        let (mut i, mut j) = (n1, n2);
        while i > 0 || j > 0 {
            let forest_distance = forest.distance(i, j);
            let Some(operation) = forest.operation(i, j) else {
                break;
            };
            let interior = i > 0 && j > 0;

            let step = match operation {
                Operation::Update => {
                    let step = EditOp::Update {
                        t1: i,
                        t2: j,
                        forest_distance,
                        cost: tables.update_cost[(i, j)],
                    };
                    i -= 1;
                    j -= 1;
                    step
                }
                Operation::Delete => {
                    let cost = if interior {
                        tables.delete_cost[(i, j)]
                    } else {
                        self.gamma(i, 0, Operation::Delete)
                    };
                    let step = EditOp::Delete {
                        t1: i,
                        forest_distance,
                        cost,
                    };
                    i -= 1;
                    step
                }
                Operation::Insert => {
                    let cost = if interior {
                        tables.insert_cost[(i, j)]
                    } else {
                        self.gamma(0, j, Operation::Insert)
                    };
                    let step = EditOp::Insert {
                        t2: j,
                        forest_distance,
                        cost,
                    };
                    j -= 1;
                    step
                }
            };

            trace!(%step, "script");
            match step.operation() {
                Operation::Delete => deletes.push(step),
                Operation::Update => updates.push(step),
                Operation::Insert => inserts.push(step),
            }
        }

        deletes.extend(updates);
        deletes.extend(inserts);
        deletes
    }

    /// Script for a comparison with an empty side: every node of the other
    /// tree, in ascending postorder, with the running total as the forest
    /// distance.
    fn degenerate_script(&self) -> Vec<EditOp> {
        let mut total = 0.0;
        let deletes = (1..=self.t1().len()).map(|i| {
            let cost = self.gamma(i, 0, Operation::Delete);
            total += cost;
            EditOp::Delete {
                t1: i,
                forest_distance: total,
                cost,
            }
        });
        let mut script: Vec<EditOp> = deletes.collect();

        let mut total = 0.0;
        script.extend((1..=self.t2().len()).map(|j| {
            let cost = self.gamma(0, j, Operation::Insert);
            total += cost;
            EditOp::Insert {
                t2: j,
                forest_distance: total,
                cost,
            }
        }));
        script
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{EditDistanceCost, UnitCost};
    use crate::distance::compute_tree_dist;
    use crate::test_trees::*;
    use crate::tree::{Tree, TreeNode};
    use facet_testhelpers::test;

    fn rendered(script: &[EditOp]) -> Vec<String> {
        script.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_first_example_script() {
        let (t1, t2) = (first_t1(), first_t2());
        let result = compute_tree_dist(&t1, &t2, UnitCost).unwrap();
        assert_eq!(
            rendered(&result.edit_script()),
            [
                "DELETE (1, 1) T1[3]",
                "UPDATE (2, 0) T1[6] -> T2[6]",
                "UPDATE (2, 0) T1[5] -> T2[5]",
                "UPDATE (1, 0) T1[4] -> T2[3]",
                "UPDATE (0, 0) T1[2] -> T2[2]",
                "UPDATE (0, 0) T1[1] -> T2[1]",
                "INSERT (2, 1) T2[4]",
            ]
        );
    }

    #[test]
    fn test_wide_example_script() {
        let (t1, t2) = (tei_t1(), tei_t2());
        let result = compute_tree_dist(&t1, &t2, UnitCost).unwrap();
        assert_eq!(
            rendered(&result.edit_script()),
            [
                "DELETE (3, 1) T1[5]",
                "DELETE (2, 1) T1[4]",
                "DELETE (1, 1) T1[3]",
                "UPDATE (3, 0) T1[10] -> T2[7]",
                "UPDATE (3, 0) T1[9] -> T2[6]",
                "UPDATE (3, 0) T1[8] -> T2[5]",
                "UPDATE (3, 0) T1[7] -> T2[4]",
                "UPDATE (3, 0) T1[6] -> T2[3]",
                "UPDATE (0, 0) T1[2] -> T2[2]",
                "UPDATE (0, 0) T1[1] -> T2[1]",
            ]
        );
    }

    #[test]
    fn test_ios_example_script() {
        let (t1, t2) = (ios_t1(), ios_t2());
        let result = compute_tree_dist(&t1, &t2, UnitCost).unwrap();
        assert_eq!(
            rendered(&result.edit_script()),
            [
                "DELETE (1, 1) T1[4]",
                "UPDATE (2, 0) T1[8] -> T2[8]",
                "UPDATE (1, 0) T1[7] -> T2[6]",
                "UPDATE (1, 0) T1[6] -> T2[5]",
                "UPDATE (1, 0) T1[5] -> T2[4]",
                "UPDATE (0, 0) T1[3] -> T2[3]",
                "UPDATE (0, 0) T1[2] -> T2[2]",
                "UPDATE (0, 0) T1[1] -> T2[1]",
                "INSERT (2, 1) T2[7]",
            ]
        );
    }

    #[test]
    fn test_every_node_appears_once() {
        let pairs = [
            (first_t1(), first_t2()),
            (tei_t1(), tei_t2()),
            (tei_t2(), first_t1()),
            (ios_t1(), first_t2()),
        ];
        for (a, b) in &pairs {
            let result = compute_tree_dist(a, b, UnitCost).unwrap();
            let script = result.edit_script();

            let mut seen1: Vec<usize> = script.iter().filter_map(EditOp::t1).collect();
            let mut seen2: Vec<usize> = script.iter().filter_map(EditOp::t2).collect();
            seen1.sort_unstable();
            seen2.sort_unstable();
            assert_eq!(seen1, (1..=result.t1().len()).collect::<Vec<_>>());
            assert_eq!(seen2, (1..=result.t2().len()).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_boundary_reads_base_row() {
        // x against a(y, x): after x -> x the first tree is used up and y
        // must come from the insert-only row, reported once.
        let t1 = Tree::from_node(&TreeNode::leaf("x"));
        let t2 = Tree::from_node(&TreeNode::new(
            "a",
            vec![TreeNode::leaf("y"), TreeNode::leaf("x")],
        ));
        let result = compute_tree_dist(&t1, &t2, UnitCost).unwrap();
        assert_eq!(result.distance(), 2.0);
        assert_eq!(
            rendered(&result.edit_script()),
            [
                "UPDATE (1, 0) T1[1] -> T2[2]",
                "INSERT (2, 1) T2[3]",
                "INSERT (1, 1) T2[1]",
            ]
        );
    }

    #[test]
    fn test_leaf_against_chain() {
        let t1 = Tree::from_node(&TreeNode::leaf("x"));
        let chain = TreeNode::new(
            "a",
            vec![TreeNode::new("b", vec![TreeNode::new("c", vec![TreeNode::leaf("x")])])],
        );
        let t2 = Tree::from_node(&chain);
        let result = compute_tree_dist(&t1, &t2, UnitCost).unwrap();
        assert_eq!(result.distance(), 3.0);

        let script = result.edit_script();
        let inserted: f64 = script
            .iter()
            .filter(|op| op.operation() == Operation::Insert)
            .map(EditOp::cost)
            .sum();
        assert_eq!(inserted, 3.0);
        assert_eq!(script.iter().filter(|op| op.t2().is_some()).count(), 4);
        assert_eq!(script.iter().filter(|op| op.t1().is_some()).count(), 1);
        assert!(script.iter().all(|op| op.operation() != Operation::Delete));
    }

    #[test]
    fn test_boundary_reads_base_column() {
        let t1 = Tree::from_node(&TreeNode::new(
            "root",
            vec![TreeNode::leaf("a"), TreeNode::leaf("b"), TreeNode::leaf("c")],
        ));
        let t2 = Tree::from_node(&TreeNode::new("root", vec![TreeNode::leaf("c")]));
        let result = compute_tree_dist(&t1, &t2, UnitCost).unwrap();
        assert_eq!(result.distance(), 2.0);

        let script = result.edit_script();
        let deleted: Vec<usize> = script
            .iter()
            .filter(|op| op.operation() == Operation::Delete)
            .filter_map(EditOp::t1)
            .collect();
        assert_eq!(deleted, [2, 1]);
        assert_eq!(script.len(), 4);
    }

    #[test]
    fn test_empty_side_lists_nodes_in_postorder() {
        let tree = first_t1();
        let empty = Tree::empty();

        let result = compute_tree_dist(&tree, &empty, UnitCost).unwrap();
        let script = result.edit_script();
        assert_eq!(script.len(), 6);
        assert_eq!(script[0].to_string(), "DELETE (1, 1) T1[1]");
        assert_eq!(script[5].to_string(), "DELETE (6, 1) T1[6]");

        let result = compute_tree_dist(&empty, &tree, EditDistanceCost::words()).unwrap();
        let script = result.edit_script();
        assert_eq!(
            script.iter().filter_map(EditOp::t2).collect::<Vec<_>>(),
            [1, 2, 3, 4, 5, 6]
        );
        assert!(script.iter().all(|op| op.operation() == Operation::Insert));

        assert!(compute_tree_dist(&empty, &empty, UnitCost)
            .unwrap()
            .edit_script()
            .is_empty());
    }

    #[test]
    fn test_script_costs_add_up_under_unit_cost() {
        for (a, b) in [
            (first_t1(), first_t2()),
            (tei_t1(), tei_t2()),
            (ios_t1(), ios_t2()),
        ] {
            let result = compute_tree_dist(&a, &b, UnitCost).unwrap();
            let total: f64 = result.edit_script().iter().map(EditOp::cost).sum();
            assert_eq!(total, result.distance());
        }
    }
}
