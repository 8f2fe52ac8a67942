//! Explicit node mapping.
//!
//! Unlike the flat script, the mapping follows the subtree structure: when a
//! forest cell was resolved by reusing a subtree distance, that subtree pair
//! is deferred and the walk jumps past it; deferred pairs get their own
//! forest afterwards. Every node of either tree ends up in exactly one pair.

use core::ops::RangeInclusive;

use facet::Facet;
use smallvec::SmallVec;

use crate::cost::{CostFunction, Operation, cheapest};
use crate::distance::{ForestDist, Tables, TreeDistance};
use crate::trace;

/// One mapped node pair. A position of 0 means "no node": `t2 == 0` is a
/// deletion, `t1 == 0` an insertion.
#[derive(Debug, Clone, Copy, PartialEq, Facet)]
pub struct MappedPair {
    /// Position in the first tree, or 0.
    pub t1: usize,
    /// Position in the second tree, or 0.
    pub t2: usize,
    /// Cost of this node's operation alone.
    pub cost: f64,
    /// Distance of the forest cell the pair was read from.
    pub distance: f64,
}

impl MappedPair {
    /// The operation this pair stands for.
    pub fn operation(&self) -> Operation {
        match (self.t1, self.t2) {
            (_, 0) => Operation::Delete,
            (0, _) => Operation::Insert,
            _ => Operation::Update,
        }
    }
}

/// A node mapping between two trees, addressable from either side.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    pairs: Vec<MappedPair>,
    /// Index into `pairs`, by position in the first tree.
    by_t1: Vec<Option<usize>>,
    /// Index into `pairs`, by position in the second tree.
    by_t2: Vec<Option<usize>>,
}

impl Mapping {
    /// Create an empty mapping for trees of the given sizes.
    pub fn with_capacity(n1: usize, n2: usize) -> Self {
        Self {
            pairs: Vec::with_capacity(n1 + n2),
            by_t1: vec![None; n1 + 1],
            by_t2: vec![None; n2 + 1],
        }
    }

    /// Record a pair.
    pub fn add(&mut self, pair: MappedPair) {
        trace!(
            t1 = pair.t1,
            t2 = pair.t2,
            cost = pair.cost,
            distance = pair.distance,
            "map"
        );
        let index = self.pairs.len();
        for (table, position) in [(&mut self.by_t1, pair.t1), (&mut self.by_t2, pair.t2)] {
            if position == 0 {
                continue;
            }
            if position >= table.len() {
                table.resize(position + 1, None);
            }
            table[position] = Some(index);
        }
        self.pairs.push(pair);
    }

    /// All pairs, in the order they were found.
    pub fn pairs(&self) -> &[MappedPair] {
        &self.pairs
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The pair holding a position of the first tree.
    pub fn for_t1(&self, position: usize) -> Option<&MappedPair> {
        let index = self.by_t1.get(position).copied().flatten()?;
        self.pairs.get(index)
    }

    /// The pair holding a position of the second tree.
    pub fn for_t2(&self, position: usize) -> Option<&MappedPair> {
        let index = self.by_t2.get(position).copied().flatten()?;
        self.pairs.get(index)
    }

    /// Sum of the per-node costs.
    pub fn total_cost(&self) -> f64 {
        self.pairs.iter().map(|pair| pair.cost).sum()
    }
}

impl<C: CostFunction> TreeDistance<'_, C> {
    /// Reconstruct the node mapping.
    ///
    /// Choices use the same tie-break as the distance (delete, then update,
    /// then insert).
    pub fn mapping(&self) -> Mapping {
        let (n1, n2) = (self.t1().len(), self.t2().len());
        let mut mapping = Mapping::with_capacity(n1, n2);

        let Some(tables) = self.tables.as_ref() else {
            self.map_leftovers(&mut mapping, 1..=n1, 1..=n2, None);
            return mapping;
        };

        // Re-running forests writes the same values again; work on a copy so
        // the result stays shareable.
        let mut scratch: Tables = tables.clone();
        let mut pending: SmallVec<[(usize, usize); 8]> = SmallVec::new();
        pending.push((n1, n2));

        while let Some((m, n)) = pending.pop() {
            let forest = self.engine.forest_distance(m, n, &mut scratch);
            self.map_forest(&forest, tables, m, n, &mut mapping, &mut pending);
        }

        mapping
    }

    fn map_forest(
        &self,
        forest: &ForestDist,
        tables: &Tables,
        m: usize,
        n: usize,
        mapping: &mut Mapping,
        pending: &mut SmallVec<[(usize, usize); 8]>,
    ) {
        let (t1, t2) = (self.t1(), self.t2());
        let (lm, ln) = (t1.leftmost(m), t2.leftmost(n));
        let (mut i, mut j) = (m, n);

        while i >= lm && j >= ln {
            let delete_cost = self.gamma(i, 0, Operation::Delete);
            let insert_cost = self.gamma(0, j, Operation::Insert);
            let delete = forest.distance(i - 1, j) + delete_cost;
            let insert = forest.distance(i, j - 1) + insert_cost;

            let (li, lj) = (t1.leftmost(i), t2.leftmost(j));
            let whole = li == lm && lj == ln;
            let update = if whole {
                forest.distance(i - 1, j - 1) + self.gamma(i, j, Operation::Update)
            } else {
                forest.distance(li - 1, lj - 1) + tables.tree_dist[(i, j)]
            };

            let (operation, distance) = cheapest([
                (Operation::Delete, delete),
                (Operation::Update, update),
                (Operation::Insert, insert),
            ]);
            match operation {
                Operation::Delete => {
                    mapping.add(MappedPair {
                        t1: i,
                        t2: 0,
                        cost: delete_cost,
                        distance,
                    });
                    i -= 1;
                }
                Operation::Insert => {
                    mapping.add(MappedPair {
                        t1: 0,
                        t2: j,
                        cost: insert_cost,
                        distance,
                    });
                    j -= 1;
                }
                Operation::Update if whole => {
                    mapping.add(MappedPair {
                        t1: i,
                        t2: j,
                        cost: self.gamma(i, j, Operation::Update),
                        distance,
                    });
                    i -= 1;
                    j -= 1;
                }
                Operation::Update => {
                    pending.push((i, j));
                    i = li - 1;
                    j = lj - 1;
                }
            }
        }

        // One side of this forest is exhausted; the rest of the other side
        // can only be deleted or inserted.
        self.map_leftovers(mapping, lm..=i, ln..=j, Some(forest));
    }

    /// Emit pure deletions for `deletes` and pure insertions for `inserts`,
    /// highest position first.
    ///
    /// Distances come from the base column/row of `forest`, or from a running
    /// total when there is no forest (one tree is empty).
    fn map_leftovers(
        &self,
        mapping: &mut Mapping,
        deletes: RangeInclusive<usize>,
        inserts: RangeInclusive<usize>,
        forest: Option<&ForestDist>,
    ) {
        let mut running: f64 = deletes
            .clone()
            .map(|p| self.gamma(p, 0, Operation::Delete))
            .sum();
        for p in deletes.rev() {
            let cost = self.gamma(p, 0, Operation::Delete);
            let distance = forest.map_or(running, |f| f.distance(p, f.col_base()));
            mapping.add(MappedPair {
                t1: p,
                t2: 0,
                cost,
                distance,
            });
            running -= cost;
        }

        let mut running: f64 = inserts
            .clone()
            .map(|q| self.gamma(0, q, Operation::Insert))
            .sum();
        for q in inserts.rev() {
            let cost = self.gamma(0, q, Operation::Insert);
            let distance = forest.map_or(running, |f| f.distance(f.row_base(), q));
            mapping.add(MappedPair {
                t1: 0,
                t2: q,
                cost,
                distance,
            });
            running -= cost;
        }
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

    fn tuples(mapping: &Mapping) -> Vec<(usize, usize, f64, f64)> {
        mapping
            .pairs()
            .iter()
            .map(|p| (p.t1, p.t2, p.cost, p.distance))
            .collect()
    }

    fn assert_covers_both_trees(mapping: &Mapping, n1: usize, n2: usize) {
        for i in 1..=n1 {
            let count = mapping.pairs().iter().filter(|p| p.t1 == i).count();
            assert_eq!(count, 1, "T1[{i}] mapped {count} times");
        }
        for j in 1..=n2 {
            let count = mapping.pairs().iter().filter(|p| p.t2 == j).count();
            assert_eq!(count, 1, "T2[{j}] mapped {count} times");
        }
    }

    #[test]
    fn test_first_example_mapping() {
        let (t1, t2) = (first_t1(), first_t2());
        let result = compute_tree_dist(&t1, &t2, UnitCost).unwrap();
        let mapping = result.mapping();

        assert_eq!(
            tuples(&mapping),
            [
                (6, 6, 0.0, 2.0),
                (0, 4, 1.0, 2.0),
                (4, 3, 0.0, 1.0),
                (3, 0, 1.0, 1.0),
                (1, 1, 0.0, 0.0),
                (2, 2, 0.0, 0.0),
                (5, 5, 0.0, 0.0),
            ]
        );
        assert_eq!(mapping.total_cost(), result.distance());
        assert_covers_both_trees(&mapping, 6, 6);
    }

    #[test]
    fn test_lookup_by_either_side() {
        let (t1, t2) = (first_t1(), first_t2());
        let mapping = compute_tree_dist(&t1, &t2, UnitCost).unwrap().mapping();

        assert_eq!(mapping.for_t1(4).map(|p| p.t2), Some(3));
        assert_eq!(mapping.for_t2(3).map(|p| p.t1), Some(4));
        assert_eq!(mapping.for_t1(3).map(MappedPair::operation), Some(Operation::Delete));
        assert_eq!(mapping.for_t2(4).map(MappedPair::operation), Some(Operation::Insert));
        assert!(mapping.for_t1(0).is_none());
        assert!(mapping.for_t1(99).is_none());
    }

    #[test]
    fn test_total_cost_matches_distance() {
        let pairs = [
            (first_t1(), first_t2()),
            (tei_t1(), tei_t2()),
            (ios_t1(), ios_t2()),
            (tei_t2(), first_t1()),
        ];
        for (a, b) in &pairs {
            let result = compute_tree_dist(a, b, UnitCost).unwrap();
            let mapping = result.mapping();
            assert_eq!(mapping.total_cost(), result.distance());
            assert_covers_both_trees(&mapping, result.t1().len(), result.t2().len());

            let result = compute_tree_dist(a, b, EditDistanceCost::characters()).unwrap();
            let mapping = result.mapping();
            assert_eq!(mapping.total_cost(), result.distance());
            assert_covers_both_trees(&mapping, result.t1().len(), result.t2().len());
        }
    }

    #[test]
    fn test_leftovers_are_emitted() {
        // r(a, b, c) against c: once c is matched, a and b remain on the
        // first side with nothing to pair them with.
        let t1 = Tree::from_node(&TreeNode::new(
            "r",
            vec![TreeNode::leaf("a"), TreeNode::leaf("b"), TreeNode::leaf("c")],
        ));
        let t2 = Tree::from_node(&TreeNode::leaf("c"));
        let result = compute_tree_dist(&t1, &t2, UnitCost).unwrap();
        assert_eq!(result.distance(), 3.0);

        let mapping = result.mapping();
        assert_covers_both_trees(&mapping, 4, 1);
        assert_eq!(mapping.total_cost(), 3.0);
        assert_eq!(mapping.for_t1(3).map(|p| p.t2), Some(1));
    }

    #[test]
    fn test_empty_side() {
        let tree = first_t2();
        let empty = Tree::empty();

        let mapping = compute_tree_dist(&tree, &empty, UnitCost).unwrap().mapping();
        assert_eq!(mapping.len(), 6);
        assert!(
            mapping
                .pairs()
                .iter()
                .all(|p| p.operation() == Operation::Delete)
        );
        assert_eq!(mapping.pairs()[0].distance, 6.0);
        assert_eq!(mapping.pairs()[5].distance, 1.0);

        let mapping = compute_tree_dist(&empty, &tree, UnitCost).unwrap().mapping();
        assert_covers_both_trees(&mapping, 0, 6);

        assert!(compute_tree_dist(&empty, &empty, UnitCost).unwrap().mapping().is_empty());
    }

    #[test]
    fn test_identical_trees_map_one_to_one() {
        let tree = tei_t1();
        let mapping = compute_tree_dist(&tree, &tree, UnitCost).unwrap().mapping();
        assert_eq!(mapping.len(), 10);
        assert!(mapping.pairs().iter().all(|p| p.t1 == p.t2 && p.cost == 0.0));
    }
}
