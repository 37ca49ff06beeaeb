//! In-memory element model for descriptor documents.
//!
//! Two representations are provided:
//!
//! - [`Document`]: an arena of nodes addressed by [`NodeId`]. Children are
//!   stored as index lists and every node knows its parent, which is what the
//!   merge engine needs for in-place replacement and ordered insertion.
//! - [`Element`]: an owned, detached subtree. Strategies consume and produce
//!   elements, and reference trees for node merging are elements too.
//!
//! [`Document::to_element`] and [`Document::graft`] copy between the two.

mod document;
mod fragment;

pub use document::{Document, NodeId};
pub use fragment::Element;
