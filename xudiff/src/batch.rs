//! Comparing many tree pairs at once.

use rayon::prelude::*;
use treedist::TreeNode;

use crate::compare::{Comparison, compare};
use crate::config::CompareConfig;
use crate::error::XuDiffError;
use crate::trace;

/// Compare every pair in parallel with the same settings.
///
/// Results come back in input order; one failing pair does not affect the
/// others.
pub fn compare_all(
    pairs: &[(TreeNode, TreeNode)],
    config: &CompareConfig,
) -> Vec<Result<Comparison, XuDiffError>> {
    trace!(pairs = pairs.len(), "comparing batch");
    pairs
        .par_iter()
        .map(|(t1, t2)| compare(t1, t2, config))
        .collect()
}
