//! Document Editor - tag-level queries and edits
//!
//! Stateless operations over a caller-owned [`XmlDocument`]:
//! - `locator`: find elements by tag name in document order
//! - `attribute`: set attributes
//! - `text`: replace the first child of matching elements
//! - `structure`: insert and delete elements
//! - `value`: read concatenated tag values
//!
//! Document-scoped operations search from [`crate::dom::DOCUMENT_NODE`], so the root
//! element itself can match.

pub mod attribute;
pub mod locator;
pub mod structure;
pub mod text;
pub mod value;

pub use attribute::set_attribute;
pub use locator::{exists, find_all, find_first};
pub use structure::{delete_tag, insert_new_tag_below, insert_tag_in_element, insert_tag_value, Inserted, Placement};
pub use text::{replace_first_child_or_append, replace_tag_value};
pub use value::{first_child_concatenated_value, get_tag_value, get_tag_values};

use crate::dom::{NodeId, XmlDocument};
use crate::error::Result;

/// Outcome of [`insert_or_update_tag_value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// Existing elements were updated; holds how many
    Updated(usize),
    /// No element existed; a single one was appended under the root element
    Inserted(NodeId),
}

/// Update every element named `tag`, or insert one if there is none
///
/// The two branches differ on purpose: an update touches ALL matches
/// (first child only, anywhere in the tree), an insert creates exactly one
/// element directly under the root element.
pub fn insert_or_update_tag_value(doc: &mut XmlDocument, tag: &str, value: &str) -> Result<Upsert> {
    if exists(doc, tag) {
        replace_tag_value(doc, tag, value).map(Upsert::Updated)
    } else {
        insert_tag_value(doc, tag, Some(value)).map(Upsert::Inserted)
    }
}
