//! Whole-document transforms.

use std::fmt;
use std::sync::Arc;

use crate::element::{Document, Element};
use crate::error::{MergeError, Result};
use crate::grammar::{DocumentFamily, Tag};

/// A program rewriting a combined merge input into a new root element.
///
/// The input has the shape `<merge><left>BASE</left><right>OVERLAY</right></merge>`
/// where `BASE` and `OVERLAY` are the two root elements.
pub trait DocumentTransform: Send + Sync {
    /// Run the transform.
    ///
    /// # Errors
    /// Implementations report failures as `MergeError::Transform`.
    fn transform(&self, input: &Element) -> Result<Element>;
}

impl<F> DocumentTransform for F
where
    F: Fn(&Element) -> Result<Element> + Send + Sync,
{
    fn transform(&self, input: &Element) -> Result<Element> {
        self(input)
    }
}

/// Strategy running a [`DocumentTransform`] over a base and an overlay.
///
/// Only meaningful for the root tag of a family: the merger hands the whole
/// documents to the transform instead of merging tag by tag.
#[derive(Clone)]
pub struct XsltStrategy {
    program: String,
    transform: Arc<dyn DocumentTransform>,
}

impl fmt::Debug for XsltStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XsltStrategy")
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

impl XsltStrategy {
    /// Wrap a transform under a program name used in errors and logs.
    pub fn new(program: impl Into<String>, transform: impl DocumentTransform + 'static) -> Self {
        Self {
            program: program.into(),
            transform: Arc::new(transform),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Build the `<merge>` input for two root elements.
    pub fn merge_input(family: &str, base: &Element, overlay: &Element) -> Element {
        Element::new(Tag::new(family, "merge"))
            .with_child(Element::new(Tag::new(family, "left")).with_child(base.clone()))
            .with_child(Element::new(Tag::new(family, "right")).with_child(overlay.clone()))
    }

    /// Transform `base` and `overlay` into a new document of `family`.
    ///
    /// Every tag of the output is resolved again through `family`, so keys
    /// and multiplicity come from the grammar. The result keeps the doctype
    /// of `base`.
    ///
    /// # Errors
    /// Returns `Transform` when the program fails or produces a root element
    /// that does not belong to the base document's family and root tag, and
    /// `UnknownTag` when a strict family rejects an element of the output.
    pub fn apply(
        &self,
        family: &DocumentFamily,
        base: &Document,
        overlay: &Document,
    ) -> Result<Document> {
        let input = Self::merge_input(
            base.family(),
            &base.root_element(),
            &overlay.root_element(),
        );
        let output = self.transform.transform(&input)?;

        let expected = base.tag(base.root());
        if output.tag() != expected {
            return Err(MergeError::Transform {
                program: self.program.clone(),
                message: format!(
                    "expected a <{}> root element of family {}, got <{}> of family {}",
                    expected.name(),
                    expected.family(),
                    output.name(),
                    output.tag().family()
                ),
            });
        }

        let mut document = Document::from_element(&resolve_tags(family, &output, None)?);
        document.set_doctype(base.doctype().map(str::to_string));
        Ok(document)
    }
}

fn resolve_tags(
    family: &DocumentFamily,
    element: &Element,
    parent: Option<&str>,
) -> Result<Element> {
    let mut resolved = Element::new(family.resolve_child_tag(element.name(), parent)?);
    for (name, value) in element.attributes() {
        resolved.set_attribute(name.clone(), value.clone());
    }
    resolved.set_text(element.text().map(str::to_string));
    for child in element.children() {
        resolved.push_child(resolve_tags(family, child, Some(element.name()))?);
    }
    Ok(resolved)
}
