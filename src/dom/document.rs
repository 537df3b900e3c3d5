//! XML Document - Arena-based mutable DOM
//!
//! Editable DOM storage with:
//! - Arena allocation for nodes
//! - NodeId indices for traversal and relinking
//! - String interning for names and character data
//!
//! Nodes are never freed. Detaching a node only unlinks it, so every
//! `NodeId` handed out stays valid for the lifetime of the document.

use std::fmt;

use super::node::{NodeId, NodeKind, XmlAttribute, XmlNode};
use super::strings::StringPool;
use crate::error::{EditError, Result};

/// ID of the document node (always the first arena slot)
pub const DOCUMENT_NODE: NodeId = 0;

/// Rendering of a node without a primitive value when it is concatenated
pub const ABSENT_VALUE: &str = "null";

/// The primitive value of a node
///
/// Character data nodes carry their payload; elements and the document
/// node have no primitive value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeValue<'d> {
    Text(&'d str),
    Absent,
}

impl NodeValue<'_> {
    /// The payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NodeValue::Text(s) => Some(s),
            NodeValue::Absent => None,
        }
    }
}

impl fmt::Display for NodeValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeValue::Text(s) => f.write_str(s),
            NodeValue::Absent => f.write_str(ABSENT_VALUE),
        }
    }
}

/// An editable XML document stored in arena format
#[derive(Debug)]
pub struct XmlDocument {
    /// Arena of nodes, index 0 is the document node
    nodes: Vec<XmlNode>,
    /// Interned strings
    pub strings: StringPool,
}

impl XmlDocument {
    /// Create a document with no root element
    pub fn empty() -> Self {
        let mut nodes = Vec::with_capacity(64);
        nodes.push(XmlNode::document());
        XmlDocument {
            nodes,
            strings: StringPool::new(),
        }
    }

    /// Create a document whose root element is named `root_name`
    pub fn new(root_name: &str) -> Self {
        let mut doc = Self::empty();
        let root = doc.create_element(root_name);
        doc.link_child(DOCUMENT_NODE, root);
        doc
    }

    // =========================================================================
    // Node access
    // =========================================================================

    /// Get root element ID (first element child of the document node)
    pub fn root_element_id(&self) -> Option<NodeId> {
        self.children(DOCUMENT_NODE)
            .find(|&id| self.nodes[id as usize].is_element())
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id as usize)
    }

    /// Get a node by ID, failing on unknown handles
    pub fn node(&self, id: NodeId) -> Result<&XmlNode> {
        self.get_node(id).ok_or(EditError::UnknownNode(id))
    }

    /// Get an element node by ID, failing on unknown or non-element handles
    pub fn element(&self, id: NodeId) -> Result<&XmlNode> {
        let node = self.node(id)?;
        if node.is_element() {
            Ok(node)
        } else {
            Err(EditError::NotAnElement(id))
        }
    }

    /// Get the node kind
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get_node(id).map(|n| n.kind)
    }

    /// Get element name as string
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        if node.is_element() {
            self.strings.get_str(node.name_id)
        } else {
            None
        }
    }

    /// Get the payload of a text, CDATA or comment node
    pub fn text_content(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        if node.is_character_data() {
            self.strings.get_str(node.name_id)
        } else {
            None
        }
    }

    /// Get the primitive value of a node
    pub fn node_value(&self, id: NodeId) -> NodeValue<'_> {
        self.text_content(id)
            .map_or(NodeValue::Absent, NodeValue::Text)
    }

    /// Get parent ID
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|n| n.parent)
    }

    /// Get first child ID
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|n| n.first_child)
    }

    /// Check whether a node is reachable from the document node
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(cid) = current {
            if cid == DOCUMENT_NODE {
                return true;
            }
            current = self.parent(cid);
        }
        false
    }

    /// Get total number of nodes (attached or not)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Get attributes for an element
    pub fn attributes(&self, id: NodeId) -> &[XmlAttribute] {
        self.get_node(id).map_or(&[], |n| n.attributes.as_slice())
    }

    /// Get attribute value by name
    pub fn get_attribute(&self, node_id: NodeId, name: &str) -> Option<&str> {
        for attr in self.attributes(node_id) {
            if self.strings.get_str(attr.name_id) == Some(name) {
                return self.strings.get_str(attr.value_id);
            }
        }
        None
    }

    /// Get all attribute names and values for a node
    pub fn get_attribute_values(&self, node_id: NodeId) -> Vec<(&str, &str)> {
        self.attributes(node_id)
            .iter()
            .filter_map(|attr| {
                let name = self.strings.get_str(attr.name_id)?;
                let value = self.strings.get_str(attr.value_id)?;
                Some((name, value))
            })
            .collect()
    }

    /// Set an attribute, overwriting an existing value in place
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        self.element(id)?;
        let name_id = self.strings.intern(name);
        let value_id = self.strings.intern(value);

        let node = &mut self.nodes[id as usize];
        match node.attributes.iter_mut().find(|a| a.name_id == name_id) {
            Some(attr) => attr.value_id = value_id,
            None => node.attributes.push(XmlAttribute::new(name_id, value_id)),
        }
        Ok(())
    }

    // =========================================================================
    // Node creation
    // =========================================================================

    fn push_node(&mut self, node: XmlNode) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        let name_id = self.strings.intern(name);
        self.push_node(XmlNode::element(name_id))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        let content_id = self.strings.intern(content);
        self.push_node(XmlNode::text(content_id))
    }

    /// Create a detached CDATA node
    pub fn create_cdata(&mut self, content: &str) -> NodeId {
        let content_id = self.strings.intern(content);
        self.push_node(XmlNode::cdata(content_id))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        let content_id = self.strings.intern(content);
        self.push_node(XmlNode::comment(content_id))
    }

    // =========================================================================
    // Structural edits
    // =========================================================================

    /// Check that `child` may be linked under `parent`
    fn check_link(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;

        if parent_node.is_character_data() {
            return Err(EditError::NotAContainer(parent));
        }
        if child_node.kind == NodeKind::Document {
            return Err(EditError::InvalidArgument("the document node cannot be a child"));
        }

        // Refuse cycles: child must not be parent or one of its ancestors
        let mut current = Some(parent);
        while let Some(cid) = current {
            if cid == child {
                return Err(EditError::InvalidArgument(
                    "cannot move a node under its own descendant",
                ));
            }
            current = self.parent(cid);
        }

        if parent == DOCUMENT_NODE && child_node.is_element() {
            if let Some(root) = self.root_element_id() {
                if root != child {
                    return Err(EditError::InvalidArgument(
                        "document already has a root element",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Link a detached child node as the last child of its new parent
    fn link_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        // Get parent's last_child first to avoid borrow issues
        let last_child_opt = self.nodes[parent_id as usize].last_child;

        if let Some(last_child_id) = last_child_opt {
            // Link to previous sibling
            self.nodes[child_id as usize].prev_sibling = Some(last_child_id);
            self.nodes[last_child_id as usize].next_sibling = Some(child_id);
        } else {
            // First child
            self.nodes[parent_id as usize].first_child = Some(child_id);
        }
        self.nodes[parent_id as usize].last_child = Some(child_id);
        self.nodes[child_id as usize].parent = Some(parent_id);
    }

    /// Unlink a node from its parent and siblings (no-op when detached)
    fn unlink(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id as usize];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        let Some(parent) = parent else {
            return;
        };

        match prev {
            Some(p) => self.nodes[p as usize].next_sibling = next,
            None => self.nodes[parent as usize].first_child = next,
        }
        match next {
            Some(n) => self.nodes[n as usize].prev_sibling = prev,
            None => self.nodes[parent as usize].last_child = prev,
        }

        let node = &mut self.nodes[id as usize];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Append `child` as the last child of `parent`
    ///
    /// A child that is already linked elsewhere is moved.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_link(parent, child)?;
        self.unlink(child);
        self.link_child(parent, child);
        Ok(())
    }

    /// Put `new_child` in the position `old_child` holds under `parent`
    ///
    /// `old_child` ends up detached; its own subtree is kept.
    pub fn replace_child(&mut self, parent: NodeId, new_child: NodeId, old_child: NodeId) -> Result<()> {
        if self.parent(old_child) != Some(parent) {
            return Err(EditError::NotAChild { parent, child: old_child });
        }
        if new_child == old_child {
            return Ok(());
        }
        self.check_link(parent, new_child)?;
        self.unlink(new_child);

        let (prev, next) = {
            let old = &self.nodes[old_child as usize];
            (old.prev_sibling, old.next_sibling)
        };
        match prev {
            Some(p) => self.nodes[p as usize].next_sibling = Some(new_child),
            None => self.nodes[parent as usize].first_child = Some(new_child),
        }
        match next {
            Some(n) => self.nodes[n as usize].prev_sibling = Some(new_child),
            None => self.nodes[parent as usize].last_child = Some(new_child),
        }

        let new = &mut self.nodes[new_child as usize];
        new.parent = Some(parent);
        new.prev_sibling = prev;
        new.next_sibling = next;

        let old = &mut self.nodes[old_child as usize];
        old.parent = None;
        old.prev_sibling = None;
        old.next_sibling = None;
        Ok(())
    }

    /// Detach `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(child)?;
        if self.parent(child) != Some(parent) {
            return Err(EditError::NotAChild { parent, child });
        }
        self.unlink(child);
        Ok(())
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Iterate over children of a node
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        let first = self.get_node(id).and_then(|n| n.first_child);
        ChildIter { doc: self, next: first }
    }

    /// Iterate over all descendants of a node in document order
    pub fn descendants(&self, id: NodeId) -> DescendantIter<'_> {
        // Initialize stack with all children in reverse order (so first is processed first)
        let mut stack = Vec::new();
        if let Some(node) = self.get_node(id) {
            let mut child_id = node.last_child;
            while let Some(cid) = child_id {
                stack.push(cid);
                child_id = self.get_node(cid).and_then(|n| n.prev_sibling);
            }
        }
        DescendantIter { doc: self, stack }
    }

    /// Iterate over descendant elements named `name` in document order
    pub fn descendants_by_tag<'d>(&'d self, id: NodeId, name: &'d str) -> impl Iterator<Item = NodeId> + 'd {
        self.descendants(id)
            .filter(move |&cid| self.node_name(cid) == Some(name))
    }
}

/// Iterator over child nodes
pub struct ChildIter<'d> {
    doc: &'d XmlDocument,
    next: Option<NodeId>,
}

impl Iterator for ChildIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.get_node(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

/// Iterator over descendant nodes (depth-first, pre-order)
pub struct DescendantIter<'d> {
    doc: &'d XmlDocument,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;

        // Add children to stack in reverse order (so first child is processed first)
        if let Some(node) = self.doc.get_node(current) {
            let mut child_id = node.last_child;
            while let Some(id) = child_id {
                self.stack.push(id);
                child_id = self.doc.get_node(id).and_then(|n| n.prev_sibling);
            }
        }

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(doc: &XmlDocument, ids: impl Iterator<Item = NodeId>) -> Vec<String> {
        ids.map(|id| {
            doc.node_name(id)
                .or_else(|| doc.text_content(id))
                .unwrap_or("")
                .to_string()
        })
        .collect()
    }

    #[test]
    fn test_new_document() {
        let doc = XmlDocument::new("root");
        let root = doc.root_element_id().unwrap();
        assert_eq!(doc.node_name(root), Some("root"));
        assert_eq!(doc.parent(root), Some(DOCUMENT_NODE));
        assert!(doc.is_attached(root));
    }

    #[test]
    fn test_empty_document() {
        let doc = XmlDocument::empty();
        assert!(doc.root_element_id().is_none());
        assert_eq!(doc.node_count(), 1);
    }

    #[test]
    fn test_append_and_descendants() {
        let mut doc = XmlDocument::new("root");
        let root = doc.root_element_id().unwrap();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        let c = doc.create_element("c");
        doc.append_child(root, a).unwrap();
        doc.append_child(root, b).unwrap();
        doc.append_child(b, c).unwrap();

        assert_eq!(names(&doc, doc.descendants(root)), ["a", "b", "c"]);
        assert_eq!(names(&doc, doc.children(root)), ["a", "b"]);

        // Sibling links
        let first = doc.get_node(a).unwrap();
        assert!(first.prev_sibling.is_none());
        assert_eq!(first.next_sibling, Some(b));
    }

    #[test]
    fn test_append_moves_linked_child() {
        let mut doc = XmlDocument::new("root");
        let root = doc.root_element_id().unwrap();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.append_child(root, a).unwrap();
        doc.append_child(root, b).unwrap();
        doc.append_child(b, a).unwrap();

        assert_eq!(names(&doc, doc.children(root)), ["b"]);
        assert_eq!(doc.parent(a), Some(b));
        assert!(doc.get_node(b).unwrap().prev_sibling.is_none());
    }

    #[test]
    fn test_append_rejects_cycle() {
        let mut doc = XmlDocument::new("root");
        let root = doc.root_element_id().unwrap();
        let a = doc.create_element("a");
        doc.append_child(root, a).unwrap();
        assert!(matches!(
            doc.append_child(a, root),
            Err(EditError::InvalidArgument(_))
        ));
        assert!(matches!(
            doc.append_child(a, a),
            Err(EditError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_append_rejects_second_root() {
        let mut doc = XmlDocument::new("root");
        let other = doc.create_element("other");
        assert!(doc.append_child(DOCUMENT_NODE, other).is_err());
        let comment = doc.create_comment("fine");
        assert!(doc.append_child(DOCUMENT_NODE, comment).is_ok());
    }

    #[test]
    fn test_append_under_text_fails() {
        let mut doc = XmlDocument::new("root");
        let t = doc.create_text("x");
        let e = doc.create_element("e");
        assert_eq!(doc.append_child(t, e), Err(EditError::NotAContainer(t)));
    }

    #[test]
    fn test_replace_child_keeps_siblings() {
        let mut doc = XmlDocument::new("root");
        let root = doc.root_element_id().unwrap();
        let first = doc.create_text("old");
        let second = doc.create_element("keep");
        doc.append_child(root, first).unwrap();
        doc.append_child(root, second).unwrap();

        let new = doc.create_text("new");
        doc.replace_child(root, new, first).unwrap();

        assert_eq!(names(&doc, doc.children(root)), ["new", "keep"]);
        assert_eq!(doc.parent(first), None);
        assert_eq!(doc.get_node(second).unwrap().prev_sibling, Some(new));
        assert_eq!(doc.get_node(root).unwrap().first_child, Some(new));
    }

    #[test]
    fn test_replace_last_child() {
        let mut doc = XmlDocument::new("root");
        let root = doc.root_element_id().unwrap();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.append_child(root, a).unwrap();
        doc.append_child(root, b).unwrap();
        let c = doc.create_element("c");
        doc.replace_child(root, c, b).unwrap();
        assert_eq!(names(&doc, doc.children(root)), ["a", "c"]);
        assert_eq!(doc.get_node(root).unwrap().last_child, Some(c));
    }

    #[test]
    fn test_replace_child_requires_parent() {
        let mut doc = XmlDocument::new("root");
        let root = doc.root_element_id().unwrap();
        let stray = doc.create_element("stray");
        let new = doc.create_text("x");
        assert_eq!(
            doc.replace_child(root, new, stray),
            Err(EditError::NotAChild { parent: root, child: stray })
        );
    }

    #[test]
    fn test_remove_child() {
        let mut doc = XmlDocument::new("root");
        let root = doc.root_element_id().unwrap();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        let c = doc.create_element("c");
        for id in [a, b, c] {
            doc.append_child(root, id).unwrap();
        }
        doc.remove_child(root, b).unwrap();
        assert_eq!(names(&doc, doc.children(root)), ["a", "c"]);
        assert!(!doc.is_attached(b));
        assert!(doc.remove_child(root, b).is_err());
    }

    #[test]
    fn test_detached_subtree_is_kept() {
        let mut doc = XmlDocument::new("root");
        let root = doc.root_element_id().unwrap();
        let a = doc.create_element("a");
        let inner = doc.create_element("inner");
        doc.append_child(root, a).unwrap();
        doc.append_child(a, inner).unwrap();
        doc.remove_child(root, a).unwrap();

        assert_eq!(doc.parent(inner), Some(a));
        assert!(!doc.is_attached(inner));
        assert_eq!(doc.descendants(DOCUMENT_NODE).count(), 1);
    }

    #[test]
    fn test_set_attribute_overwrites_in_place() {
        let mut doc = XmlDocument::new("root");
        let root = doc.root_element_id().unwrap();
        doc.set_attribute(root, "a", "1").unwrap();
        doc.set_attribute(root, "b", "2").unwrap();
        doc.set_attribute(root, "a", "3").unwrap();
        assert_eq!(doc.get_attribute_values(root), vec![("a", "3"), ("b", "2")]);
        assert_eq!(doc.get_attribute(root, "b"), Some("2"));
        assert_eq!(doc.get_attribute(root, "B"), None);
    }

    #[test]
    fn test_set_attribute_on_text_fails() {
        let mut doc = XmlDocument::new("root");
        let t = doc.create_text("x");
        assert_eq!(doc.set_attribute(t, "a", "1"), Err(EditError::NotAnElement(t)));
        assert_eq!(doc.set_attribute(99, "a", "1"), Err(EditError::UnknownNode(99)));
    }

    #[test]
    fn test_node_value() {
        let mut doc = XmlDocument::new("root");
        let root = doc.root_element_id().unwrap();
        let t = doc.create_text("hi");
        let c = doc.create_comment("note");
        assert_eq!(doc.node_value(t), NodeValue::Text("hi"));
        assert_eq!(doc.node_value(c), NodeValue::Text("note"));
        assert_eq!(doc.node_value(root), NodeValue::Absent);
        assert_eq!(NodeValue::Absent.to_string(), "null");
        assert_eq!(NodeValue::Absent.as_str(), None);
    }

    #[test]
    fn test_descendants_by_tag() {
        let mut doc = XmlDocument::new("root");
        let root = doc.root_element_id().unwrap();
        let a1 = doc.create_element("a");
        let b = doc.create_element("b");
        let a2 = doc.create_element("a");
        let text = doc.create_text("a");
        doc.append_child(root, a1).unwrap();
        doc.append_child(root, b).unwrap();
        doc.append_child(b, a2).unwrap();
        doc.append_child(b, text).unwrap();

        let found: Vec<_> = doc.descendants_by_tag(root, "a").collect();
        assert_eq!(found, vec![a1, a2]);
        assert_eq!(doc.descendants_by_tag(root, "A").count(), 0);
    }
}
