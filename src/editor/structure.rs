//! Element creation and removal.

use crate::dom::{NodeId, XmlDocument, DOCUMENT_NODE};
use crate::error::{EditError, Result};

use super::locator::{find_all, find_first};

/// Where a newly inserted element ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Reachable from the document node
    Attached,
    /// Linked under a freshly created parent that is not part of the document
    Orphaned,
}

/// Result of [`insert_new_tag_below`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inserted {
    /// The new element
    pub element: NodeId,
    /// The parent it was appended to
    pub parent: NodeId,
    pub placement: Placement,
}

impl Inserted {
    pub fn is_attached(&self) -> bool {
        self.placement == Placement::Attached
    }
}

/// Append `<new_tag>value</new_tag>` under the first element named `append_to`
///
/// When no such element exists a new `append_to` element is created as the
/// parent, but that parent is NOT linked into the document: the insert is
/// reported as [`Placement::Orphaned`] and stays invisible to lookups.
pub fn insert_new_tag_below(
    doc: &mut XmlDocument,
    append_to: &str,
    new_tag: &str,
    value: &str,
) -> Result<Inserted> {
    let (parent, placement) = match find_first(doc, DOCUMENT_NODE, append_to) {
        Some(id) => (id, Placement::Attached),
        None => (doc.create_element(append_to), Placement::Orphaned),
    };

    let element = doc.create_element(new_tag);
    doc.append_child(parent, element)?;
    let text = doc.create_text(value);
    doc.append_child(element, text)?;

    match placement {
        Placement::Attached => log::debug!("inserted <{new_tag}> below <{append_to}>"),
        Placement::Orphaned => {
            log::warn!("no <{append_to}> in document, <{new_tag}> inserted below a detached parent")
        }
    }
    Ok(Inserted { element, parent, placement })
}

/// Append a new element named `tag` as the last child of the root element
///
/// With `Some(value)` the element gets a text child; `None` leaves it empty.
pub fn insert_tag_value(doc: &mut XmlDocument, tag: &str, value: Option<&str>) -> Result<NodeId> {
    let root = doc.root_element_id().ok_or(EditError::MissingRootElement)?;
    let element = doc.create_element(tag);
    doc.append_child(root, element)?;
    if let Some(value) = value {
        let text = doc.create_text(value);
        doc.append_child(element, text)?;
    }
    log::debug!("inserted <{tag}> under root element");
    Ok(element)
}

/// Append `<tag>value</tag>` as the last child of `parent`
///
/// `value` is required: `None` is rejected before the tree is touched.
pub fn insert_tag_in_element(
    doc: &mut XmlDocument,
    parent: NodeId,
    tag: &str,
    value: Option<&str>,
) -> Result<NodeId> {
    let value = value.ok_or(EditError::InvalidArgument("tag value must not be null"))?;
    doc.element(parent)?;

    let element = doc.create_element(tag);
    doc.append_child(parent, element)?;
    let text = doc.create_text(value);
    doc.append_child(element, text)?;
    log::debug!("inserted <{tag}> under node {parent}");
    Ok(element)
}

/// Detach every element named `tag` from its parent
///
/// Matches are collected once before anything is removed; nested matches
/// are detached from their (already detached) ancestors as well. Returns
/// the number of elements removed.
pub fn delete_tag(doc: &mut XmlDocument, tag: &str) -> Result<usize> {
    let matches = find_all(doc, DOCUMENT_NODE, tag);
    for &node in &matches {
        let parent = doc.parent(node).ok_or(EditError::MissingParent(node))?;
        doc.remove_child(parent, node)?;
    }
    log::debug!("deleted {} <{tag}> element(s)", matches.len());
    Ok(matches.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{write_document, write_node, WriteOptions};
    use crate::editor::locator::exists;

    fn xml(doc: &XmlDocument) -> String {
        write_document(doc, &WriteOptions { declaration: false })
    }

    #[test]
    fn test_insert_below_existing() {
        let mut doc = XmlDocument::new("cfg");
        let root = doc.root_element_id().unwrap();
        let server = doc.create_element("server");
        doc.append_child(root, server).unwrap();

        let inserted = insert_new_tag_below(&mut doc, "server", "host", "localhost").unwrap();
        assert_eq!(inserted.placement, Placement::Attached);
        assert_eq!(inserted.parent, server);
        assert!(inserted.is_attached());
        assert_eq!(xml(&doc), "<cfg><server><host>localhost</host></server></cfg>");
    }

    #[test]
    fn test_insert_below_first_match_only() {
        let mut doc = XmlDocument::new("cfg");
        let root = doc.root_element_id().unwrap();
        let first = doc.create_element("server");
        let second = doc.create_element("server");
        doc.append_child(root, first).unwrap();
        doc.append_child(root, second).unwrap();

        let inserted = insert_new_tag_below(&mut doc, "server", "host", "h").unwrap();
        assert_eq!(inserted.parent, first);
        assert_eq!(xml(&doc), "<cfg><server><host>h</host></server><server/></cfg>");
    }

    #[test]
    fn test_insert_below_missing_parent_is_orphaned() {
        let mut doc = XmlDocument::new("cfg");
        let inserted = insert_new_tag_below(&mut doc, "missing", "child", "v").unwrap();

        assert_eq!(inserted.placement, Placement::Orphaned);
        assert!(!exists(&doc, "child"));
        assert!(!exists(&doc, "missing"));
        assert!(!doc.is_attached(inserted.element));
        assert_eq!(xml(&doc), "<cfg/>");
        assert_eq!(write_node(&doc, inserted.parent), "<missing><child>v</child></missing>");
    }

    #[test]
    fn test_insert_tag_value_scenario() {
        let mut doc = XmlDocument::new("cfg");
        let port = insert_tag_value(&mut doc, "port", Some("8080")).unwrap();
        let root = doc.root_element_id().unwrap();
        assert_eq!(doc.children(root).collect::<Vec<_>>(), vec![port]);
        assert_eq!(xml(&doc), "<cfg><port>8080</port></cfg>");
    }

    #[test]
    fn test_insert_tag_value_none_is_childless() {
        let mut doc = XmlDocument::new("cfg");
        let flag = insert_tag_value(&mut doc, "flag", None).unwrap();
        assert!(doc.first_child(flag).is_none());
        assert_eq!(xml(&doc), "<cfg><flag/></cfg>");
    }

    #[test]
    fn test_insert_tag_value_without_root() {
        let mut doc = XmlDocument::empty();
        assert_eq!(
            insert_tag_value(&mut doc, "port", Some("1")),
            Err(EditError::MissingRootElement)
        );
    }

    #[test]
    fn test_insert_tag_in_element() {
        let mut doc = XmlDocument::new("cfg");
        let root = doc.root_element_id().unwrap();
        let db = insert_tag_value(&mut doc, "db", None).unwrap();
        insert_tag_in_element(&mut doc, db, "user", Some("admin")).unwrap();
        insert_tag_in_element(&mut doc, root, "mode", Some("")).unwrap();
        assert_eq!(xml(&doc), "<cfg><db><user>admin</user></db><mode></mode></cfg>");
    }

    #[test]
    fn test_insert_tag_in_element_none_rejected() {
        let mut doc = XmlDocument::new("cfg");
        let root = doc.root_element_id().unwrap();
        let before = doc.node_count();
        assert!(matches!(
            insert_tag_in_element(&mut doc, root, "user", None),
            Err(EditError::InvalidArgument(_))
        ));
        assert_eq!(doc.node_count(), before);
        assert_eq!(xml(&doc), "<cfg/>");
    }

    #[test]
    fn test_insert_tag_in_text_rejected() {
        let mut doc = XmlDocument::new("cfg");
        let text = doc.create_text("t");
        let before = doc.node_count();
        assert_eq!(
            insert_tag_in_element(&mut doc, text, "user", Some("x")),
            Err(EditError::NotAnElement(text))
        );
        assert_eq!(doc.node_count(), before);
    }

    #[test]
    fn test_delete_tag_all_and_idempotent() {
        let mut doc = XmlDocument::new("cfg");
        insert_tag_value(&mut doc, "port", Some("1")).unwrap();
        insert_tag_value(&mut doc, "host", Some("h")).unwrap();
        insert_tag_value(&mut doc, "port", Some("2")).unwrap();

        assert_eq!(delete_tag(&mut doc, "port").unwrap(), 2);
        let once = xml(&doc);
        assert_eq!(once, "<cfg><host>h</host></cfg>");

        assert_eq!(delete_tag(&mut doc, "port").unwrap(), 0);
        assert_eq!(xml(&doc), once);
    }

    #[test]
    fn test_delete_nested_matches() {
        let mut doc = XmlDocument::new("cfg");
        let outer = insert_tag_value(&mut doc, "item", None).unwrap();
        let inner = insert_tag_in_element(&mut doc, outer, "item", Some("x")).unwrap();

        assert_eq!(delete_tag(&mut doc, "item").unwrap(), 2);
        assert_eq!(xml(&doc), "<cfg/>");
        assert!(doc.parent(outer).is_none());
        assert!(doc.parent(inner).is_none());
    }

    #[test]
    fn test_delete_root_then_insert() {
        let mut doc = XmlDocument::new("cfg");
        assert_eq!(delete_tag(&mut doc, "cfg").unwrap(), 1);
        assert!(doc.root_element_id().is_none());
        assert_eq!(
            insert_tag_value(&mut doc, "port", None),
            Err(EditError::MissingRootElement)
        );
    }
}
