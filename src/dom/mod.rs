//! DOM Module - Arena-based editable XML Document
//!
//! Implements the tree engine the editor works on:
//! - Arena allocation for nodes (never freed, so handles stay valid)
//! - NodeId (u32) indices with parent/sibling links for O(1) relinking
//! - String interning for element names, attributes and character data
//! - Construction from host node descriptions and serialization to XML text

pub mod builder;
pub mod document;
pub mod node;
pub mod strings;
pub mod writer;

pub use builder::{build_document, build_node, NodeSpec};
pub use document::{NodeValue, XmlDocument, ABSENT_VALUE, DOCUMENT_NODE};
pub use node::{NodeId, NodeKind, XmlAttribute, XmlNode};
pub use strings::StringPool;
pub use writer::{write_document, write_node, WriteOptions};
