//! Plain-text reports of a finished comparison.
//!
//! Nothing here does I/O; reports go to any [`core::fmt::Write`].

use core::fmt::{self, Write};

use treedist::{MappedPair, NodeField};

use crate::compare::{Comparison, Side};

/// Width values are padded to in mapping lines.
const VALUE_WIDTH: usize = 50;

/// Marker for the absent side of a deletion or insertion.
const ABSENT: &str = "^";

/// Write the distance followed by the edit script, one step per line.
///
/// ```text
/// Distance: 2
/// DELETE (1, 1) T1[3]
/// UPDATE (2, 0) T1[6] -> T2[6]
/// ...
/// ```
pub fn write_edit_script<W: Write>(out: &mut W, comparison: &Comparison) -> fmt::Result {
    let unit = comparison.config.unit();
    if unit.is_empty() {
        writeln!(out, "Distance: {}", comparison.distance)?;
    } else {
        writeln!(out, "Distance: {} {unit}", comparison.distance)?;
    }
    for step in &comparison.script {
        writeln!(out, "{step}")?;
    }
    Ok(())
}

/// Write the node mapping: updates and deletions in first-tree preorder,
/// then insertions in second-tree preorder.
///
/// Each line is `OP<TAB>distance<TAB>cost<TAB><old> ===> <new>`, where the
/// values are the requested `fields` of each node (the type in parentheses)
/// and `^` marks the absent side.
pub fn write_mapping<W: Write>(
    out: &mut W,
    comparison: &Comparison,
    fields: &[NodeField],
) -> fmt::Result {
    let mut by_t1: Vec<Option<&MappedPair>> = vec![None; comparison.t1.len() + 1];
    let mut by_t2: Vec<Option<&MappedPair>> = vec![None; comparison.t2.len() + 1];
    for pair in &comparison.mapping {
        // Slot 0 collects the absent side and is never read.
        if let Some(slot) = by_t1.get_mut(pair.t1) {
            *slot = Some(pair);
        }
        if let Some(slot) = by_t2.get_mut(pair.t2) {
            *slot = Some(pair);
        }
    }

    for &i in &comparison.t1.preorder {
        let Some(pair) = by_t1.get(i).copied().flatten() else {
            continue;
        };
        let old = node_values(&comparison.t1, i, fields);
        if pair.t2 == 0 {
            write_line(out, "D", pair, &old, ABSENT)?;
        } else {
            let new = node_values(&comparison.t2, pair.t2, fields);
            write_line(out, "U", pair, &old, &new)?;
        }
    }

    for &j in &comparison.t2.preorder {
        let Some(pair) = by_t2.get(j).copied().flatten().filter(|pair| pair.t1 == 0) else {
            continue;
        };
        let new = node_values(&comparison.t2, j, fields);
        write_line(out, "I", pair, ABSENT, &new)?;
    }

    Ok(())
}

fn write_line<W: Write>(
    out: &mut W,
    op: &str,
    pair: &MappedPair,
    old: &str,
    new: &str,
) -> fmt::Result {
    writeln!(
        out,
        "{op}\t{}\t{}\t{old:<width$} ===> {new:<width$} ",
        pair.distance,
        pair.cost,
        width = VALUE_WIDTH
    )
}

/// The requested fields of a node, space-separated. Newlines are escaped so
/// every mapping entry stays on one line; a missing value renders empty.
fn node_values(side: &Side, position: usize, fields: &[NodeField]) -> String {
    let Some(node) = side.node(position) else {
        return String::new();
    };
    let mut values = String::new();
    for (k, &field) in fields.iter().enumerate() {
        if k > 0 {
            values.push(' ');
        }
        let value = node.field(field).unwrap_or_default().replace('\n', "\\n");
        match field {
            NodeField::Kind => {
                values.push('(');
                values.push_str(&value);
                values.push(')');
            }
            NodeField::Label => values.push_str(&value),
        }
    }
    values
}
