//! XML input and output for descriptor documents.

mod parser;
mod utils;
mod writer;

pub use parser::{parse_document, parse_element};
pub use utils::{
    element_children, get_tag_name, leaf_text, namespace_declarations, qualified_attributes,
};
pub use writer::{write_document, write_element};
