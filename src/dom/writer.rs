//! XML Serialization
//!
//! Writes a document or any subtree (attached or orphaned) back to XML text.
//! Uses an explicit stack so deep trees cannot overflow the native stack.

use memchr::memchr3_iter;

use super::document::{XmlDocument, DOCUMENT_NODE};
use super::node::{NodeId, NodeKind};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Output options for [`write_document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Emit the `<?xml version="1.0" encoding="UTF-8"?>` prolog
    pub declaration: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions { declaration: true }
    }
}

/// Serialize the whole document
pub fn write_document(doc: &XmlDocument, options: &WriteOptions) -> String {
    let mut buf = String::with_capacity(1024);
    if options.declaration {
        buf.push_str(XML_DECLARATION);
    }
    write_into(doc, DOCUMENT_NODE, &mut buf);
    buf
}

/// Serialize a single node and its subtree
pub fn write_node(doc: &XmlDocument, node_id: NodeId) -> String {
    let mut buf = String::with_capacity(256);
    write_into(doc, node_id, &mut buf);
    buf
}

fn write_into(doc: &XmlDocument, node_id: NodeId, buf: &mut String) {
    // Stack entries: Either entering a node or need to write closing tag
    enum StackEntry {
        Enter(NodeId),
        Close(NodeId),
    }

    let mut stack: Vec<StackEntry> = Vec::with_capacity(64);
    stack.push(StackEntry::Enter(node_id));

    while let Some(entry) = stack.pop() {
        match entry {
            StackEntry::Close(id) => {
                if let Some(name) = doc.node_name(id) {
                    buf.push_str("</");
                    buf.push_str(name);
                    buf.push('>');
                }
            }
            StackEntry::Enter(current_id) => {
                let Some(node) = doc.get_node(current_id) else {
                    continue;
                };

                match node.kind {
                    NodeKind::Element => {
                        buf.push('<');
                        buf.push_str(doc.node_name(current_id).unwrap_or(""));

                        for (name, value) in doc.get_attribute_values(current_id) {
                            buf.push(' ');
                            buf.push_str(name);
                            buf.push_str("=\"");
                            escape_into(value, [b'&', b'<', b'"'], buf);
                            buf.push('"');
                        }

                        if node.first_child.is_none() {
                            buf.push_str("/>");
                            continue;
                        }
                        buf.push('>');
                        stack.push(StackEntry::Close(current_id));
                        push_children_reversed(doc, node.last_child, &mut stack, StackEntry::Enter);
                    }
                    NodeKind::Document => {
                        push_children_reversed(doc, node.last_child, &mut stack, StackEntry::Enter);
                    }
                    NodeKind::Text => {
                        let content = doc.text_content(current_id).unwrap_or("");
                        escape_into(content, [b'&', b'<', b'>'], buf);
                    }
                    NodeKind::CData => {
                        buf.push_str("<![CDATA[");
                        buf.push_str(doc.text_content(current_id).unwrap_or(""));
                        buf.push_str("]]>");
                    }
                    NodeKind::Comment => {
                        buf.push_str("<!--");
                        buf.push_str(doc.text_content(current_id).unwrap_or(""));
                        buf.push_str("-->");
                    }
                }
            }
        }
    }
}

/// Push children in reverse order using last_child->prev_sibling
fn push_children_reversed<T>(
    doc: &XmlDocument,
    last_child: Option<NodeId>,
    stack: &mut Vec<T>,
    wrap: impl Fn(NodeId) -> T,
) {
    let mut child_id = last_child;
    while let Some(cid) = child_id {
        stack.push(wrap(cid));
        child_id = doc.get_node(cid).and_then(|n| n.prev_sibling);
    }
}

/// Escape the three `specials` bytes into their entity references
#[inline]
fn escape_into(s: &str, specials: [u8; 3], buf: &mut String) {
    let bytes = s.as_bytes();
    let mut start = 0;
    for pos in memchr3_iter(specials[0], specials[1], specials[2], bytes) {
        buf.push_str(&s[start..pos]);
        buf.push_str(match bytes[pos] {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            _ => "&quot;",
        });
        start = pos + 1;
    }
    buf.push_str(&s[start..]);
}
