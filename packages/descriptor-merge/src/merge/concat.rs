//! Policy-free concatenation of documents.

use crate::element::Document;
use crate::error::{MergeError, Result};

/// Concatenate the top-level children of several documents.
///
/// The result takes its root element (tag, attributes and doctype) from the
/// first document; the children of every document follow in input order.
/// No conflict resolution takes place, so duplicates are kept.
///
/// # Errors
/// Returns `EmptyMerge` for an empty input and `FamilyMismatch` when the
/// documents belong to different families.
pub fn merge_documents(documents: &[Document]) -> Result<Document> {
    let first = documents.first().ok_or(MergeError::EmptyMerge)?;

    let mut merged = Document::new(first.tag(first.root()).clone());
    merged.set_doctype(first.doctype().map(str::to_string));
    let root = merged.root();
    for (name, value) in first.attributes(first.root()) {
        merged.set_attribute(root, name.clone(), value.clone());
    }

    for document in documents {
        if document.family() != first.family() {
            return Err(MergeError::FamilyMismatch {
                expected: first.family().to_string(),
                found: document.family().to_string(),
            });
        }
        for &child in document.children(document.root()) {
            let id = merged.graft(&document.to_element(child));
            merged.append_child(root, id);
        }
    }

    tracing::debug!(
        documents = documents.len(),
        children = merged.children(root).len(),
        "Concatenated documents"
    );
    Ok(merged)
}
