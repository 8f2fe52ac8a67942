//! Structural diffing for documents already turned into trees, built on
//! treedist.
//!
//! xudiff provides:
//! - **Reading**: canonical trees from JSON (`label`, `type`, `children`)
//! - **Comparing**: distance, flat edit script, and node mapping in one pass
//! - **Reporting**: the edit script and the mapping as plain text
//! - **Batches**: many pairs compared in parallel
//!
//! # Example
//!
//! ```rust
//! use xudiff::{CompareConfig, CostModel, compare, parse_tree, write_edit_script};
//!
//! let old = parse_tree(r#"{
//!     "label": "interface Loopback0",
//!     "children": [
//!         {"label": "description management"},
//!         {"label": "ip address 129.170.9.157 255.255.255.255"}
//!     ]
//! }"#).unwrap();
//! let new = parse_tree(r#"{
//!     "label": "interface Loopback0",
//!     "children": [
//!         {"label": "description management"},
//!         {"label": "ip address 129.170.9.195 255.255.255.255"}
//!     ]
//! }"#).unwrap();
//!
//! let config = CompareConfig::default().with_cost(CostModel::WordEditDistance);
//! let comparison = compare(&old, &new, &config).unwrap();
//! assert_eq!(comparison.distance, 1.0);
//!
//! let mut report = String::new();
//! write_edit_script(&mut report, &comparison).unwrap();
//! assert!(report.starts_with("Distance: 1 word\n"));
//! ```

mod tracing_macros;

mod batch;
pub mod compare;
pub mod config;
mod error;
pub mod report;

pub use batch::compare_all;
pub use compare::{Comparison, NodeInfo, Side, compare, compare_trees, parse_tree};
pub use config::CompareConfig;
pub use error::XuDiffError;
pub use report::{write_edit_script, write_mapping};

// Re-export the engine types that show up in comparisons
pub use treedist::{
    CostModel, EditOp, MappedPair, NodeField, Operation, Tree, TreeDistError, TreeNode,
};
