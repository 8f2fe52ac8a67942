//! Zhang–Shasha tree edit distance.
//!
//! For every pair of keyroots (ascending) the engine fills a forest-distance
//! table for the two subtrees. Cells where both forests are whole subtrees
//! are written into the shared `tree_dist` table, together with the operation
//! chosen and the three operation costs. Other cells reuse `tree_dist` instead
//! of recomputing subtree distances.
//!
//! Everything is indexed by postorder position; row and column 0 stand for
//! the empty forest.

use core::ops::{Index, IndexMut};

use crate::cost::{CostFunction, Operation, cheapest};
use crate::error::TreeDistError;
use crate::preprocess::PreparedTree;
use crate::tree::{NodeField, Tree};
use crate::{debug, trace};

/// Dense row-major matrix.
#[derive(Debug, Clone)]
pub(crate) struct Matrix<T> {
    cols: usize,
    cells: Vec<T>,
}

impl<T: Clone> Matrix<T> {
    pub(crate) fn new(rows: usize, cols: usize, fill: T) -> Self {
        Self {
            cols,
            cells: vec![fill; rows * cols],
        }
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.cells[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.cells[row * self.cols + col]
    }
}

/// Tables shared by every keyroot pair, sized `(n1 + 1) × (n2 + 1)`.
#[derive(Debug, Clone)]
pub(crate) struct Tables {
    pub(crate) tree_dist: Matrix<f64>,
    pub(crate) tree_ops: Matrix<Option<Operation>>,
    pub(crate) update_cost: Matrix<f64>,
    pub(crate) insert_cost: Matrix<f64>,
    pub(crate) delete_cost: Matrix<f64>,
}

impl Tables {
    fn new(n1: usize, n2: usize) -> Self {
        let (rows, cols) = (n1 + 1, n2 + 1);
        Self {
            tree_dist: Matrix::new(rows, cols, 0.0),
            tree_ops: Matrix::new(rows, cols, None),
            update_cost: Matrix::new(rows, cols, 0.0),
            insert_cost: Matrix::new(rows, cols, 0.0),
            delete_cost: Matrix::new(rows, cols, 0.0),
        }
    }
}

/// Forest distances between the prefixes of two subtrees.
///
/// Covers positions `l(i) - 1 ..= i` of the first tree and `l(j) - 1 ..= j` of
/// the second, where the lowest position of each range stands for the empty
/// forest. Cells are addressed by postorder position.
#[derive(Debug, Clone)]
pub struct ForestDist {
    row_base: usize,
    col_base: usize,
    dist: Matrix<f64>,
    ops: Matrix<Option<Operation>>,
}

impl ForestDist {
    fn new(row_base: usize, col_base: usize, rows: usize, cols: usize) -> Self {
        Self {
            row_base,
            col_base,
            dist: Matrix::new(rows, cols, 0.0),
            ops: Matrix::new(rows, cols, None),
        }
    }

    #[inline]
    fn cell(&self, i: usize, j: usize) -> (usize, usize) {
        (i - self.row_base, j - self.col_base)
    }

    #[inline]
    fn set(&mut self, i: usize, j: usize, (op, dist): (Operation, f64)) {
        let cell = self.cell(i, j);
        self.dist[cell] = dist;
        self.ops[cell] = Some(op);
    }

    /// Distance between the forest ending at `i` and the forest ending at `j`.
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.dist[self.cell(i, j)]
    }

    /// Operation chosen for the cell, `None` for the empty/empty corner.
    #[inline]
    pub fn operation(&self, i: usize, j: usize) -> Option<Operation> {
        self.ops[self.cell(i, j)]
    }

    /// Position standing for the empty forest of the first tree.
    pub fn row_base(&self) -> usize {
        self.row_base
    }

    /// Position standing for the empty forest of the second tree.
    pub fn col_base(&self) -> usize {
        self.col_base
    }
}

/// The two prepared trees and the cost function.
#[derive(Debug, Clone)]
pub(crate) struct Engine<'a, C> {
    pub(crate) t1: PreparedTree<'a>,
    pub(crate) t2: PreparedTree<'a>,
    cost: C,
    /// Delete cost per position of `t1` (index 0 unused).
    delete: Vec<f64>,
    /// Insert cost per position of `t2` (index 0 unused).
    insert: Vec<f64>,
}

impl<'a, C: CostFunction> Engine<'a, C> {
    fn new(t1: PreparedTree<'a>, t2: PreparedTree<'a>, cost: C) -> Self {
        let delete = (0..=t1.len())
            .map(|i| if i == 0 { 0.0 } else { cost.delete(t1.value(i)) })
            .collect();
        let insert = (0..=t2.len())
            .map(|j| if j == 0 { 0.0 } else { cost.insert(t2.value(j)) })
            .collect();
        Self {
            t1,
            t2,
            cost,
            delete,
            insert,
        }
    }

    /// Cost of `op` between position `i` of the first tree and position `j`
    /// of the second; 0 stands for "no node".
    #[inline]
    pub(crate) fn gamma(&self, i: usize, j: usize, op: Operation) -> f64 {
        match op {
            Operation::Delete => self.delete[i],
            Operation::Insert => self.insert[j],
            Operation::Update => self.cost.update(self.t1.value(i), self.t2.value(j)),
        }
    }

    /// Fill the forest table for the subtrees rooted at `i` and `j`.
    pub(crate) fn forest_distance(&self, i: usize, j: usize, tables: &mut Tables) -> ForestDist {
        let li = self.t1.leftmost(i);
        let lj = self.t2.leftmost(j);
        let (row_base, col_base) = (li - 1, lj - 1);

        let mut fd = ForestDist::new(row_base, col_base, i - li + 2, j - lj + 2);
        trace!(i, j, rows = i - li + 2, cols = j - lj + 2, "forest");

        for i1 in li..=i {
            let d = fd.distance(i1 - 1, col_base) + self.gamma(i1, 0, Operation::Delete);
            fd.set(i1, col_base, (Operation::Delete, d));
        }
        for j1 in lj..=j {
            let d = fd.distance(row_base, j1 - 1) + self.gamma(0, j1, Operation::Insert);
            fd.set(row_base, j1, (Operation::Insert, d));
        }

        for i1 in li..=i {
            let li1 = self.t1.leftmost(i1);
            let delete_cost = self.gamma(i1, 0, Operation::Delete);

            for j1 in lj..=j {
                let lj1 = self.t2.leftmost(j1);
                let insert_cost = self.gamma(0, j1, Operation::Insert);

                let delete = fd.distance(i1 - 1, j1) + delete_cost;
                let insert = fd.distance(i1, j1 - 1) + insert_cost;

                if li1 == li && lj1 == lj {
                    let update_cost = self.gamma(i1, j1, Operation::Update);
                    let update = fd.distance(i1 - 1, j1 - 1) + update_cost;

                    let best = cheapest([
                        (Operation::Delete, delete),
                        (Operation::Update, update),
                        (Operation::Insert, insert),
                    ]);
                    fd.set(i1, j1, best);

                    tables.tree_dist[(i1, j1)] = best.1;
                    tables.tree_ops[(i1, j1)] = Some(best.0);
                    tables.update_cost[(i1, j1)] = update_cost;
                    tables.insert_cost[(i1, j1)] = insert_cost;
                    tables.delete_cost[(i1, j1)] = delete_cost;
                } else {
                    let update = fd.distance(li1 - 1, lj1 - 1) + tables.tree_dist[(i1, j1)];
                    fd.set(
                        i1,
                        j1,
                        cheapest([
                            (Operation::Delete, delete),
                            (Operation::Update, update),
                            (Operation::Insert, insert),
                        ]),
                    );
                }
            }
        }

        fd
    }
}

/// The result of comparing two trees.
///
/// Holds the prepared trees, the filled tables, and the forest of the root
/// pair, from which edit scripts and mappings are reconstructed.
#[derive(Debug, Clone)]
pub struct TreeDistance<'a, C> {
    pub(crate) engine: Engine<'a, C>,
    /// `None` when either tree is empty.
    pub(crate) tables: Option<Tables>,
    pub(crate) root_forest: Option<ForestDist>,
    distance: f64,
}

/// Compare two trees on their labels.
pub fn compute_tree_dist<'a, C: CostFunction>(
    t1: &'a Tree,
    t2: &'a Tree,
    cost: C,
) -> Result<TreeDistance<'a, C>, TreeDistError> {
    compute_tree_dist_by(t1, t2, cost, NodeField::Label)
}

/// Compare two trees, pricing operations on the selected node field.
///
/// Both trees are validated before any table is allocated. An empty tree on
/// either side is not an error: the distance is then the total cost of
/// deleting (or inserting) every node of the other tree.
pub fn compute_tree_dist_by<'a, C: CostFunction>(
    t1: &'a Tree,
    t2: &'a Tree,
    cost: C,
    field: NodeField,
) -> Result<TreeDistance<'a, C>, TreeDistError> {
    let t1 = PreparedTree::new(t1, field)?;
    let t2 = PreparedTree::new(t2, field)?;
    let engine = Engine::new(t1, t2, cost);
    let (n1, n2) = (engine.t1.len(), engine.t2.len());

    debug!(n1, n2, "compute_tree_dist start");

    if n1 == 0 || n2 == 0 {
        let distance = engine.delete.iter().sum::<f64>() + engine.insert.iter().sum::<f64>();
        debug!(distance, "one side empty");
        return Ok(TreeDistance {
            engine,
            tables: None,
            root_forest: None,
            distance,
        });
    }

    let mut tables = Tables::new(n1, n2);
    let mut root_forest = None;
    for &i in engine.t1.keyroots() {
        for &j in engine.t2.keyroots() {
            root_forest = Some(engine.forest_distance(i, j, &mut tables));
        }
    }

    let distance = tables.tree_dist[(n1, n2)];
    debug!(
        distance,
        pairs = engine.t1.keyroots().len() * engine.t2.keyroots().len(),
        "compute_tree_dist done"
    );

    Ok(TreeDistance {
        engine,
        tables: Some(tables),
        root_forest,
        distance,
    })
}

impl<'a, C: CostFunction> TreeDistance<'a, C> {
    /// The tree edit distance.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// The first tree, flattened.
    pub fn t1(&self) -> &PreparedTree<'a> {
        &self.engine.t1
    }

    /// The second tree, flattened.
    pub fn t2(&self) -> &PreparedTree<'a> {
        &self.engine.t2
    }

    /// Cost of an operation between two positions (0 for "no node").
    pub fn gamma(&self, i: usize, j: usize, op: Operation) -> f64 {
        self.engine.gamma(i, j, op)
    }

    fn in_range(&self, i: usize, j: usize) -> bool {
        (1..=self.engine.t1.len()).contains(&i) && (1..=self.engine.t2.len()).contains(&j)
    }

    /// Distance between the subtree at position `i` of the first tree and
    /// the subtree at position `j` of the second.
    pub fn tree_dist(&self, i: usize, j: usize) -> Option<f64> {
        let tables = self.tables.as_ref()?;
        self.in_range(i, j).then(|| tables.tree_dist[(i, j)])
    }

    /// Operation chosen when the `(i, j)` subtree cell was resolved.
    pub fn tree_operation(&self, i: usize, j: usize) -> Option<Operation> {
        let tables = self.tables.as_ref()?;
        if self.in_range(i, j) {
            tables.tree_ops[(i, j)]
        } else {
            None
        }
    }

    /// Cost of `op` recorded when the `(i, j)` subtree cell was resolved.
    pub fn operation_cost(&self, i: usize, j: usize, op: Operation) -> Option<f64> {
        let tables = self.tables.as_ref()?;
        if !self.in_range(i, j) {
            return None;
        }
        Some(match op {
            Operation::Delete => tables.delete_cost[(i, j)],
            Operation::Update => tables.update_cost[(i, j)],
            Operation::Insert => tables.insert_cost[(i, j)],
        })
    }

    /// Forest table of the root pair. `None` when either tree is empty.
    pub fn root_forest(&self) -> Option<&ForestDist> {
        self.root_forest.as_ref()
    }
}
