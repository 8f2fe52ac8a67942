//! Comparing two canonical trees.

use facet::Facet;
use treedist::traversal::{postorder_ids, preorder_ids};
use treedist::{EditOp, MappedPair, NodeField, PreparedTree, Tree, TreeNode, compute_tree_dist_by};

use crate::config::CompareConfig;
use crate::debug;
use crate::error::XuDiffError;

/// The reportable fields of one node.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct NodeInfo {
    /// Node label.
    #[facet(default)]
    pub label: Option<String>,
    /// Node type.
    #[facet(default, rename = "type")]
    pub kind: Option<String>,
}

impl NodeInfo {
    /// Value of a field.
    pub fn field(&self, field: NodeField) -> Option<&str> {
        match field {
            NodeField::Label => self.label.as_deref(),
            NodeField::Kind => self.kind.as_deref(),
        }
    }
}

/// One side of a comparison, flattened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct Side {
    /// Nodes by postorder position; `nodes[k]` is position `k + 1`.
    pub nodes: Vec<NodeInfo>,
    /// Postorder positions listed in preorder.
    pub preorder: Vec<usize>,
}

impl Side {
    fn new(prepared: &PreparedTree<'_>) -> Self {
        let tree = prepared.tree();
        let nodes = postorder_ids(tree)
            .into_iter()
            .map(|id| {
                let data = tree.get(id);
                NodeInfo {
                    label: data.label.clone(),
                    kind: data.kind.clone(),
                }
            })
            .collect();
        let preorder = preorder_ids(tree)
            .into_iter()
            .filter_map(|id| prepared.position(id))
            .collect();
        Self { nodes, preorder }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether this side is the empty tree.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at a postorder position.
    pub fn node(&self, position: usize) -> Option<&NodeInfo> {
        position.checked_sub(1).and_then(|k| self.nodes.get(k))
    }
}

/// A finished comparison.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct Comparison {
    /// Settings the comparison ran with.
    pub config: CompareConfig,
    /// Tree edit distance.
    pub distance: f64,
    /// Flat edit script: deletions, updates, insertions.
    pub script: Vec<EditOp>,
    /// Node mapping, in discovery order.
    pub mapping: Vec<MappedPair>,
    /// The first tree.
    pub t1: Side,
    /// The second tree.
    pub t2: Side,
}

/// Compare two arena trees.
pub fn compare_trees(
    t1: &Tree,
    t2: &Tree,
    config: &CompareConfig,
) -> Result<Comparison, XuDiffError> {
    let result = compute_tree_dist_by(t1, t2, config.cost, config.field)?;
    let script = result.edit_script();
    let mapping = result.mapping().pairs().to_vec();

    debug!(
        distance = result.distance(),
        steps = script.len(),
        pairs = mapping.len(),
        "compared"
    );

    Ok(Comparison {
        config: *config,
        distance: result.distance(),
        script,
        mapping,
        t1: Side::new(result.t1()),
        t2: Side::new(result.t2()),
    })
}

/// Compare two canonical trees.
pub fn compare(
    t1: &TreeNode,
    t2: &TreeNode,
    config: &CompareConfig,
) -> Result<Comparison, XuDiffError> {
    compare_trees(&Tree::from_node(t1), &Tree::from_node(t2), config)
}

/// Read a canonical tree from JSON: `{"label": ..., "type": ..., "children":
/// [...]}`.
pub fn parse_tree(json: &str) -> Result<TreeNode, XuDiffError> {
    facet_json::from_str(json).map_err(|err| XuDiffError::InvalidTree {
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;
    use treedist::{CostModel, Operation};

    fn config_line(label: &str) -> TreeNode {
        TreeNode::leaf(label).with_kind("line")
    }

    fn interface(lines: &[&str]) -> TreeNode {
        TreeNode::new(
            "interface Loopback0",
            lines.iter().map(|line| config_line(line)).collect(),
        )
        .with_kind("interface")
    }

    #[test]
    fn test_compare_interfaces() {
        let v1 = interface(&[
            "description management",
            "ip address 129.170.9.157 255.255.255.255",
        ]);
        let v2 = interface(&[
            "description management",
            "ip address 129.170.9.195 255.255.255.255",
        ]);

        let unit = compare(&v1, &v2, &CompareConfig::default()).unwrap();
        assert_eq!(unit.distance, 1.0);

        let words = CompareConfig::default().with_cost(CostModel::WordEditDistance);
        assert_eq!(compare(&v1, &v2, &words).unwrap().distance, 1.0);

        let bytes = CompareConfig::default().with_cost(CostModel::ByteEditDistance);
        let cmp = compare(&v1, &v2, &bytes).unwrap();
        assert_eq!(cmp.distance, 2.0);
        assert_eq!(cmp.script.len(), 3);
        assert!(cmp.script.iter().all(|op| op.operation() == Operation::Update));
    }

    #[test]
    fn test_sides_are_flattened() {
        let v1 = interface(&["a", "b"]);
        let cmp = compare(&v1, &v1, &CompareConfig::default()).unwrap();
        assert_eq!(cmp.t1.len(), 3);
        assert_eq!(cmp.t1.preorder, [3, 1, 2]);
        assert_eq!(
            cmp.t1.node(3).and_then(|n| n.field(NodeField::Kind)),
            Some("interface")
        );
        assert_eq!(cmp.t1.node(1).and_then(|n| n.label.as_deref()), Some("a"));
        assert!(cmp.t1.node(0).is_none());
    }

    #[test]
    fn test_compare_on_kind() {
        let v1 = TreeNode::new("x", vec![TreeNode::leaf("y").with_kind("b")]).with_kind("a");
        let v2 = TreeNode::new("p", vec![TreeNode::leaf("q").with_kind("b")]).with_kind("a");
        let on_kind = CompareConfig::default().with_field(NodeField::Kind);
        assert_eq!(compare(&v1, &v2, &on_kind).unwrap().distance, 0.0);
        assert_eq!(compare(&v1, &v2, &CompareConfig::default()).unwrap().distance, 2.0);
    }

    #[test]
    fn test_parse_tree() {
        let tree = parse_tree(
            r#"{"label": "root", "type": "section", "children": [{"label": "leaf"}]}"#,
        )
        .unwrap();
        assert_eq!(tree.label.as_deref(), Some("root"));
        assert_eq!(tree.kind.as_deref(), Some("section"));
        assert_eq!(tree.children, [TreeNode::leaf("leaf")]);

        let err = parse_tree(r#"{"label": 12"#).unwrap_err();
        assert!(matches!(err, XuDiffError::InvalidTree { .. }));
    }

    #[test]
    fn test_comparison_serializes() {
        let v1 = interface(&["a"]);
        let v2 = interface(&["b"]);
        let cmp = compare(&v1, &v2, &CompareConfig::default()).unwrap();
        let json = facet_json::to_string(&cmp).unwrap();
        assert!(json.contains("\"distance\""));
        assert!(json.contains("\"script\""));
    }
}
