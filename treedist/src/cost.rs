//! Per-operation cost functions.
//!
//! The engine prices every delete, insert, and update through a
//! [`CostFunction`]. Three strategies are provided: [`UnitCost`], and
//! [`EditDistanceCost`] over words, characters, or bytes. [`CostModel`] names
//! them for configuration.

use core::fmt;
use core::str::FromStr;

use facet::Facet;

use crate::error::TreeDistError;
use crate::levenshtein::{Tokenization, edit_distance};

/// Added to an insert or delete cost that would otherwise be exactly zero
/// (a node with an empty or missing value).
///
/// This keeps zero-length nodes from forming free insert/delete chains, so
/// backtracking prefers aligning them with an update. All other costs produced
/// by the built-in strategies are whole numbers, so a cost of this size can
/// only ever come from this rule.
pub const ZERO_COST_EPSILON: f64 = 0.001;

/// An edit operation.
///
/// Declaration order is the tie-break order: when several operations reach
/// the same minimal cost, the earliest one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
#[repr(u8)]
pub enum Operation {
    /// Remove a node of the first tree.
    Delete,
    /// Align a node of the first tree with a node of the second tree.
    Update,
    /// Add a node of the second tree.
    Insert,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Delete => "DELETE",
            Operation::Update => "UPDATE",
            Operation::Insert => "INSERT",
        })
    }
}

/// Pick the cheapest candidate, honoring the tie-break order of the slice.
///
/// Candidates must be given as `[delete, update, insert]`.
#[inline]
pub(crate) fn cheapest(candidates: [(Operation, f64); 3]) -> (Operation, f64) {
    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.1 < best.1 {
            best = *candidate;
        }
    }
    best
}

/// Prices edit operations on node values.
///
/// `None` is a node without a value (e.g. a missing label).
pub trait CostFunction {
    /// Cost of deleting a node of the first tree.
    fn delete(&self, value: Option<&str>) -> f64;

    /// Cost of inserting a node of the second tree.
    fn insert(&self, value: Option<&str>) -> f64;

    /// Cost of aligning a node of the first tree with one of the second.
    fn update(&self, a: Option<&str>, b: Option<&str>) -> f64;

    /// Dispatch on an [`Operation`]. The unused side is ignored.
    fn cost(&self, a: Option<&str>, b: Option<&str>, operation: Operation) -> f64 {
        match operation {
            Operation::Delete => self.delete(a),
            Operation::Insert => self.insert(b),
            Operation::Update => self.update(a, b),
        }
    }
}

impl<C: CostFunction + ?Sized> CostFunction for &C {
    fn delete(&self, value: Option<&str>) -> f64 {
        (**self).delete(value)
    }

    fn insert(&self, value: Option<&str>) -> f64 {
        (**self).insert(value)
    }

    fn update(&self, a: Option<&str>, b: Option<&str>) -> f64 {
        (**self).update(a, b)
    }
}

/// Deletes and inserts cost 1; updates cost 0 when the values match after
/// trimming surrounding whitespace, 1 otherwise.
///
/// Two missing values match; a missing value never matches a present one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitCost;

impl CostFunction for UnitCost {
    fn delete(&self, _value: Option<&str>) -> f64 {
        1.0
    }

    fn insert(&self, _value: Option<&str>) -> f64 {
        1.0
    }

    fn update(&self, a: Option<&str>, b: Option<&str>) -> f64 {
        let same = match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => a.trim() == b.trim(),
            _ => false,
        };
        if same { 0.0 } else { 1.0 }
    }
}

/// Costs measured in tokens.
///
/// Deleting or inserting a node costs the token count of its value; updating
/// costs the Levenshtein distance between the two values. Zero-cost inserts
/// and deletes are bumped to [`ZERO_COST_EPSILON`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditDistanceCost {
    tokenization: Tokenization,
}

impl EditDistanceCost {
    /// Edit-distance cost with the given tokenization.
    pub fn new(tokenization: Tokenization) -> Self {
        Self { tokenization }
    }

    /// Word-level edit distance.
    pub fn words() -> Self {
        Self::new(Tokenization::Word)
    }

    /// Character-level edit distance.
    pub fn characters() -> Self {
        Self::new(Tokenization::Character)
    }

    /// Byte-level edit distance.
    pub fn bytes() -> Self {
        Self::new(Tokenization::Byte)
    }

    /// The tokenization in use.
    pub fn tokenization(&self) -> Tokenization {
        self.tokenization
    }

    fn length_cost(&self, value: Option<&str>) -> f64 {
        let tokens = edit_distance(value, None, self.tokenization);
        if tokens == 0 {
            ZERO_COST_EPSILON
        } else {
            tokens as f64
        }
    }
}

impl CostFunction for EditDistanceCost {
    fn delete(&self, value: Option<&str>) -> f64 {
        self.length_cost(value)
    }

    fn insert(&self, value: Option<&str>) -> f64 {
        self.length_cost(value)
    }

    fn update(&self, a: Option<&str>, b: Option<&str>) -> f64 {
        edit_distance(a, b, self.tokenization) as f64
    }
}

/// A named cost strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum CostModel {
    /// [`UnitCost`].
    #[default]
    Unit,
    /// [`EditDistanceCost`] over words.
    WordEditDistance,
    /// [`EditDistanceCost`] over characters.
    CharacterEditDistance,
    /// [`EditDistanceCost`] over bytes.
    ByteEditDistance,
}

impl CostModel {
    /// All models, in declaration order.
    pub const ALL: [CostModel; 4] = [
        CostModel::Unit,
        CostModel::WordEditDistance,
        CostModel::CharacterEditDistance,
        CostModel::ByteEditDistance,
    ];

    /// The configuration name of this model.
    pub fn name(self) -> &'static str {
        match self {
            CostModel::Unit => "unit_cost",
            CostModel::WordEditDistance => "word_edist_cost",
            CostModel::CharacterEditDistance => "char_edist_cost",
            CostModel::ByteEditDistance => "byte_edist_cost",
        }
    }

    /// The tokenization labels are measured in, `None` for unit costs.
    pub fn tokenization(self) -> Option<Tokenization> {
        match self {
            CostModel::Unit => None,
            CostModel::WordEditDistance => Some(Tokenization::Word),
            CostModel::CharacterEditDistance => Some(Tokenization::Character),
            CostModel::ByteEditDistance => Some(Tokenization::Byte),
        }
    }
}

impl FromStr for CostModel {
    type Err = TreeDistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unit_cost" | "unit" => Ok(CostModel::Unit),
            "word_edist_cost" | "word_edit_distance_cost" => Ok(CostModel::WordEditDistance),
            "char_edist_cost" | "character_edit_distance_cost" => {
                Ok(CostModel::CharacterEditDistance)
            }
            "byte_edist_cost" | "byte_edit_distance_cost" => Ok(CostModel::ByteEditDistance),
            other => Err(TreeDistError::UnknownCostModel {
                name: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for CostModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl CostFunction for CostModel {
    fn delete(&self, value: Option<&str>) -> f64 {
        match self.tokenization() {
            None => UnitCost.delete(value),
            Some(t) => EditDistanceCost::new(t).delete(value),
        }
    }

    fn insert(&self, value: Option<&str>) -> f64 {
        match self.tokenization() {
            None => UnitCost.insert(value),
            Some(t) => EditDistanceCost::new(t).insert(value),
        }
    }

    fn update(&self, a: Option<&str>, b: Option<&str>) -> f64 {
        match self.tokenization() {
            None => UnitCost.update(a, b),
            Some(t) => EditDistanceCost::new(t).update(a, b),
        }
    }
}
