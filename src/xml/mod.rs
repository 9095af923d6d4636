//! Two-stage normalization: raw text to a lossless tree ([`parse_document`]),
//! then the lossless tree to the grouped form specs work with ([`normalize`]).

pub mod builder;
pub mod errors;
pub mod grouped;
pub mod node;
pub mod parser;

pub use builder::{escape_attribute, escape_text, render_element};
pub use errors::XmlError;
pub use grouped::{normalize, ChildGroup, GroupedAttribute, GroupedNode};
pub use node::{Span, XmlAttribute, XmlDocument, XmlElement, XmlNode};
pub use parser::parse_document;
