//! Errors reported by the engine.

use facet::Facet;

/// Errors that can occur while configuring or preparing a comparison.
///
/// Configuration errors come from parsing names (cost models, tokenizations,
/// node fields). Structural errors come from malformed trees and are always
/// reported before any distance matrix is allocated.
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
#[facet(derive(Error))]
#[repr(u8)]
pub enum TreeDistError {
    /// unrecognized cost model `{name}`
    UnknownCostModel { name: String },

    /// unrecognized tokenization `{name}`
    UnknownTokenization { name: String },

    /// unrecognized node field `{name}`
    UnknownField { name: String },

    /// cannot attach node {child} under node {parent}: {reason}
    AttachFailed {
        parent: usize,
        child: usize,
        reason: String,
    },

    /// node {node} is not reachable from the root
    DetachedNode { node: usize },

    /// node at postorder position {position} was visited before its first child
    UnresolvedChild { position: usize },
}

impl TreeDistError {
    /// Whether this error was caused by a bad configuration name rather than a
    /// malformed tree.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TreeDistError::UnknownCostModel { .. }
                | TreeDistError::UnknownTokenization { .. }
                | TreeDistError::UnknownField { .. }
        )
    }
}
