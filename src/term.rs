//! Elixir Term Conversion Utilities
//!
//! Converts between Elixir terms and editable documents.
//!
//! Element terms use the shape `{:element, name, attrs, children}` where
//! `attrs` is a list of `{name, value}` binaries and `children` holds
//! element tuples, plain binaries (text), `{:cdata, binary}` and
//! `{:comment, binary}`.

use rustler::types::atom;
use rustler::{Atom, Encoder, Env, NewBinary, Term};

use crate::dom::{NodeId, NodeKind, NodeSpec, XmlDocument};
use crate::editor::{Inserted, Placement, Upsert};
use crate::error::{EditError, Result};

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    element,
    cdata,
    comment,
    attached,
    orphaned,
    updated,
    inserted,
}

/// Convert a node to an Elixir term
pub fn node_to_term<'a>(env: Env<'a>, doc: &XmlDocument, node_id: NodeId) -> Term<'a> {
    let node = match doc.get_node(node_id) {
        Some(n) => n,
        None => return atom::nil().encode(env),
    };

    match node.kind {
        NodeKind::Element => {
            let name_term = str_to_binary(env, doc.node_name(node_id).unwrap_or(""));

            // Build lists in reverse order so prepending keeps document order
            let mut attrs = Term::list_new_empty(env);
            for (name, value) in doc.get_attribute_values(node_id).into_iter().rev() {
                let attr_tuple = (str_to_binary(env, name), str_to_binary(env, value));
                attrs = attrs.list_prepend(attr_tuple.encode(env));
            }

            let mut children = Term::list_new_empty(env);
            let mut child_id = node.last_child;
            while let Some(cid) = child_id {
                children = children.list_prepend(node_to_term(env, doc, cid));
                child_id = doc.get_node(cid).and_then(|n| n.prev_sibling);
            }

            (element(), name_term, attrs, children).encode(env)
        }
        NodeKind::Text => str_to_binary(env, doc.text_content(node_id).unwrap_or("")),
        NodeKind::CData => {
            let content = doc.text_content(node_id).unwrap_or("");
            (cdata(), str_to_binary(env, content)).encode(env)
        }
        NodeKind::Comment => {
            let content = doc.text_content(node_id).unwrap_or("");
            (comment(), str_to_binary(env, content)).encode(env)
        }
        NodeKind::Document => match doc.root_element_id() {
            Some(root_id) => node_to_term(env, doc, root_id),
            None => atom::nil().encode(env),
        },
    }
}

/// Decode an element term (and its subtree) into a node description
pub fn term_to_spec<'a>(term: Term<'a>) -> Result<NodeSpec> {
    if term.is_binary() {
        let content: String = term
            .decode()
            .map_err(|_| EditError::InvalidTerm("text must be a UTF-8 binary".to_string()))?;
        return Ok(NodeSpec::Text(content));
    }

    if let Ok((tag, name, attributes, children)) =
        term.decode::<(Atom, String, Vec<(String, String)>, Vec<Term<'a>>)>()
    {
        if tag == element() {
            let children = children
                .into_iter()
                .map(term_to_spec)
                .collect::<Result<Vec<_>>>()?;
            return Ok(NodeSpec::Element { name, attributes, children });
        }
    }

    if let Ok((tag, content)) = term.decode::<(Atom, String)>() {
        if tag == cdata() {
            return Ok(NodeSpec::CData(content));
        }
        if tag == comment() {
            return Ok(NodeSpec::Comment(content));
        }
    }

    Err(EditError::InvalidTerm(
        "expected {:element, name, attrs, children}, {:cdata, text}, {:comment, text} or a binary"
            .to_string(),
    ))
}

/// Encode an edit result as `{:ok, value}` or `{:error, reason}`
pub fn result_to_term<'a, T: Encoder>(env: Env<'a>, result: Result<T>) -> Term<'a> {
    match result {
        Ok(value) => (atom::ok(), value).encode(env),
        Err(e) => error_to_term(env, &e),
    }
}

pub fn error_to_term<'a>(env: Env<'a>, error: &EditError) -> Term<'a> {
    (atom::error(), error.to_string()).encode(env)
}

/// `{node_id, :attached | :orphaned}`
pub fn inserted_to_term<'a>(env: Env<'a>, inserted: &Inserted) -> Term<'a> {
    let placement = match inserted.placement {
        Placement::Attached => attached(),
        Placement::Orphaned => orphaned(),
    };
    (inserted.element, placement).encode(env)
}

/// `{:updated, count}` or `{:inserted, node_id}`
pub fn upsert_to_term<'a>(env: Env<'a>, upsert: &Upsert) -> Term<'a> {
    match *upsert {
        Upsert::Updated(count) => (updated(), count).encode(env),
        Upsert::Inserted(id) => (inserted(), id).encode(env),
    }
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
