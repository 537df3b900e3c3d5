//! Document construction from a plain node description
//!
//! Hosts hand documents over as nested element descriptions; this module
//! turns such a description into an arena document.

use super::document::{XmlDocument, DOCUMENT_NODE};
use super::node::NodeId;
use crate::error::{EditError, Result};

/// Owned description of a node and its subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSpec {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        children: Vec<NodeSpec>,
    },
    Text(String),
    CData(String),
    Comment(String),
}

impl NodeSpec {
    /// Element with no attributes
    pub fn element(name: impl Into<String>, children: Vec<NodeSpec>) -> Self {
        NodeSpec::Element {
            name: name.into(),
            attributes: Vec::new(),
            children,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        NodeSpec::Text(content.into())
    }
}

/// Build a document whose root element is `root`
pub fn build_document(root: &NodeSpec) -> Result<XmlDocument> {
    if !matches!(root, NodeSpec::Element { .. }) {
        return Err(EditError::InvalidTerm("document root must be an element".to_string()));
    }
    let mut doc = XmlDocument::empty();
    let root_id = build_node(&mut doc, root)?;
    doc.append_child(DOCUMENT_NODE, root_id)?;
    Ok(doc)
}

/// Build a detached subtree inside `doc`, returning its top node
pub fn build_node(doc: &mut XmlDocument, spec: &NodeSpec) -> Result<NodeId> {
    let id = match spec {
        NodeSpec::Element { name, attributes, children } => {
            if name.is_empty() {
                return Err(EditError::InvalidTerm("element name must not be empty".to_string()));
            }
            let id = doc.create_element(name);
            for (attr_name, attr_value) in attributes {
                doc.set_attribute(id, attr_name, attr_value)?;
            }
            for child in children {
                let child_id = build_node(doc, child)?;
                doc.append_child(id, child_id)?;
            }
            id
        }
        NodeSpec::Text(content) => doc.create_text(content),
        NodeSpec::CData(content) => doc.create_cdata(content),
        NodeSpec::Comment(content) => doc.create_comment(content),
    };
    Ok(id)
}
