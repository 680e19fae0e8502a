//! Generic XML tree with faithful round-tripping
//!
//! The tree keeps element order, attribute order, whitespace text and comments
//! so that untouched parts of a document come back out unchanged.

mod node;
mod reader;
mod writer;

pub use node::{
    Attributes, NodeId, XmlChild, XmlDeclaration, XmlElement, XmlFragment, XmlTree,
};
pub use reader::{parse_xml, read_xml};
pub use writer::{
    SerializeOptions, escape_attribute, escape_text, flatten_text, serialize_element,
    serialize_xml, write_xml,
};
