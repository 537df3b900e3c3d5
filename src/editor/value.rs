//! Reading tag values.
//!
//! A value is the concatenation of the primitive values of an element's
//! immediate children. Character data contributes its payload; a child
//! element has no primitive value and contributes the absent marker
//! (`null`) instead of being skipped.

use std::fmt::Write;

use crate::dom::{NodeId, XmlDocument};

use super::locator::find_all;

/// Concatenated values of the immediate children of `node`
pub fn first_child_concatenated_value(doc: &XmlDocument, node: NodeId) -> String {
    let mut value = String::new();
    for child in doc.children(node) {
        // Writing to a String cannot fail
        let _ = write!(value, "{}", doc.node_value(child));
    }
    value
}

/// Value of the first element named `tag` below `element`
///
/// `None` when `element` is `None` or nothing matches.
pub fn get_tag_value(doc: &XmlDocument, element: Option<NodeId>, tag: &str) -> Option<String> {
    let element = element?;
    let first = *find_all(doc, element, tag).first()?;
    Some(first_child_concatenated_value(doc, first))
}

/// For every element named `tag` below `element`, the value of the first
/// element named `tag` nested INSIDE that match
///
/// A match without a same-named descendant yields `None`, so for flat
/// documents every entry is `None`.
pub fn get_tag_values(doc: &XmlDocument, element: NodeId, tag: &str) -> Vec<Option<String>> {
    find_all(doc, element, tag)
        .into_iter()
        .map(|m| get_tag_value(doc, Some(m), tag))
        .collect()
}
