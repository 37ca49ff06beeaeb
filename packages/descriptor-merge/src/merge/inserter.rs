//! Insertion of children at the position implied by the grammar.

use crate::element::{Document, Element, NodeId};
use crate::error::Result;
use crate::grammar::DocumentFamily;

/// Rank of a tag in a canonical order. Unlisted tags sort after all listed
/// ones.
fn rank(order: &[String], name: &str) -> usize {
    order
        .iter()
        .position(|listed| listed == name)
        .unwrap_or(usize::MAX)
}

/// Insert `child` under `parent` respecting the canonical order of the
/// parent's tag.
///
/// The child goes before the first existing child that ranks strictly
/// higher, so it lands after its own siblings and unlisted children keep
/// their relative order. When the parent has no declared order the child is
/// appended. Returns the index the child was inserted at.
///
/// # Errors
/// Returns `IndexOutOfRange` if the computed position is invalid, which
/// cannot happen for a consistent tree.
pub fn insert_ordered(
    document: &mut Document,
    parent: NodeId,
    child: NodeId,
    family: &DocumentFamily,
) -> Result<usize> {
    document.detach(child);
    let siblings = document.children(parent);

    let index = match family.order_of(document.name(parent)) {
        Some(order) => {
            let own = rank(order, document.name(child));
            siblings
                .iter()
                .position(|&sibling| rank(order, document.name(sibling)) > own)
                .unwrap_or(siblings.len())
        }
        None => siblings.len(),
    };

    document.insert_child(parent, index, child)?;
    Ok(index)
}

/// Stably sort a detached child list by a canonical order.
pub fn order_children(children: &mut [Element], order: &[String]) {
    children.sort_by_key(|child| rank(order, child.name()));
}
