//! Errors reported by the comparison layer.

use facet::Facet;
use treedist::TreeDistError;

/// Errors that can occur while reading trees or comparing them.
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
#[facet(derive(Error))]
#[repr(u8)]
pub enum XuDiffError {
    /// invalid tree JSON: {message}
    InvalidTree { message: String },

    /// comparison failed: {error}
    Engine { error: TreeDistError },
}

impl From<TreeDistError> for XuDiffError {
    fn from(error: TreeDistError) -> Self {
        XuDiffError::Engine { error }
    }
}
