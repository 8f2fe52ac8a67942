//! Comparison settings.

use facet::Facet;
use treedist::{CostModel, NodeField};

use crate::error::XuDiffError;

/// How two trees are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Facet)]
pub struct CompareConfig {
    /// Cost strategy for deletes, inserts, and updates.
    pub cost: CostModel,

    /// Node field the costs are computed on.
    pub field: NodeField,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            cost: CostModel::Unit,
            field: NodeField::Label,
        }
    }
}

impl CompareConfig {
    /// Build a configuration from its names, e.g. `("word_edist_cost",
    /// "label")`.
    pub fn from_names(cost: &str, field: &str) -> Result<Self, XuDiffError> {
        Ok(Self {
            cost: cost.parse()?,
            field: field.parse()?,
        })
    }

    /// Use a different cost strategy.
    pub fn with_cost(mut self, cost: CostModel) -> Self {
        self.cost = cost;
        self
    }

    /// Compare a different node field.
    pub fn with_field(mut self, field: NodeField) -> Self {
        self.field = field;
        self
    }

    /// Unit suffix for reported distances: the tokenization name, or empty
    /// for unit costs.
    pub fn unit(&self) -> &'static str {
        self.cost.tokenization().map_or("", |t| t.name())
    }
}
