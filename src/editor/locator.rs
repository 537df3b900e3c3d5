//! Tag lookup in document order.

use crate::dom::{NodeId, XmlDocument, DOCUMENT_NODE};

/// All elements named `tag` below `scope`, in document order
///
/// `scope` itself is never part of the result. Pass [`DOCUMENT_NODE`] to
/// search the whole document, root element included.
pub fn find_all(doc: &XmlDocument, scope: NodeId, tag: &str) -> Vec<NodeId> {
    doc.descendants_by_tag(scope, tag).collect()
}

/// First element named `tag` below `scope`
pub fn find_first(doc: &XmlDocument, scope: NodeId, tag: &str) -> Option<NodeId> {
    doc.descendants_by_tag(scope, tag).next()
}

/// Whether any element in the document is named `tag`
pub fn exists(doc: &XmlDocument, tag: &str) -> bool {
    find_first(doc, DOCUMENT_NODE, tag).is_some()
}
