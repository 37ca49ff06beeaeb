//! Tag registry and grammar of descriptor families.
//!
//! A [`DocumentFamily`] declares the tags of one descriptor format, which of
//! them may repeat, how repeatable siblings are identified, and the order in
//! which children must appear under a container. Families are collected in a
//! [`GrammarRegistry`] that is passed explicitly to the parser, the merger
//! and the configuration loader.

mod family;
pub mod presets;
mod registry;
mod tag;

pub use family::{DocumentFamily, UnknownTagPolicy};
pub use presets::{create_application_family, create_default_grammar, create_web_app_family};
pub use registry::GrammarRegistry;
pub use tag::{Tag, TagKey};
