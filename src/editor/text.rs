//! Text content updates.
//!
//! Only the FIRST child of an element is ever replaced. Any further
//! children (mixed content, nested elements) stay where they are and
//! follow the new text node.

use crate::dom::{NodeId, XmlDocument, DOCUMENT_NODE};
use crate::error::Result;

use super::locator::find_all;

/// Replace the first child of `element` with a text node holding `value`,
/// or append that text node when `element` has no children
pub fn replace_first_child_or_append(doc: &mut XmlDocument, element: NodeId, value: &str) -> Result<()> {
    let first = doc.element(element)?.first_child;
    let text = doc.create_text(value);
    match first {
        Some(old) => doc.replace_child(element, text, old),
        None => doc.append_child(element, text),
    }
}

/// Apply [`replace_first_child_or_append`] to every element named `tag`
///
/// Returns the number of elements updated.
pub fn replace_tag_value(doc: &mut XmlDocument, tag: &str, value: &str) -> Result<usize> {
    let matches = find_all(doc, DOCUMENT_NODE, tag);
    for &element in &matches {
        replace_first_child_or_append(doc, element, value)?;
    }
    log::debug!("replaced value of {} <{tag}> element(s)", matches.len());
    Ok(matches.len())
}
