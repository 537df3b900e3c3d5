//! TagEdit - tag-level editing of XML documents
//!
//! Layers:
//! - `dom`: arena-based editable document (the tree engine)
//! - `editor`: stateless tag queries and edits on top of `dom`
//! - NIF surface: documents held in a ResourceArc, nodes addressed by id

use rustler::{Encoder, Env, NifResult, ResourceArc, Term};

pub mod dom;
pub mod editor;
pub mod error;
mod resource;
mod term;

use dom::{NodeId, WriteOptions, XmlDocument, DOCUMENT_NODE};
use resource::{DocumentRef, DocumentResource};
use term::{error_to_term, inserted_to_term, node_to_term, result_to_term, upsert_to_term};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "memory_tracking")]
mod tracking {
    use std::alloc::{GlobalAlloc, Layout};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub static ALLOCATED: AtomicUsize = AtomicUsize::new(0);
    pub static PEAK_ALLOCATED: AtomicUsize = AtomicUsize::new(0);

    pub struct TrackingAllocator;

    #[cfg(feature = "mimalloc")]
    static UNDERLYING: mimalloc::MiMalloc = mimalloc::MiMalloc;

    #[cfg(not(feature = "mimalloc"))]
    static UNDERLYING: std::alloc::System = std::alloc::System;

    unsafe impl GlobalAlloc for TrackingAllocator {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            let ptr = UNDERLYING.alloc(layout);
            if !ptr.is_null() {
                let current = ALLOCATED.fetch_add(layout.size(), Ordering::Relaxed) + layout.size();
                PEAK_ALLOCATED.fetch_max(current, Ordering::Relaxed);
            }
            ptr
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            ALLOCATED.fetch_sub(layout.size(), Ordering::Relaxed);
            UNDERLYING.dealloc(ptr, layout)
        }
    }
}

#[cfg(feature = "memory_tracking")]
#[global_allocator]
static GLOBAL: tracking::TrackingAllocator = tracking::TrackingAllocator;

#[cfg(all(feature = "mimalloc", not(feature = "memory_tracking")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Memory Tracking NIFs
// ============================================================================

#[cfg(feature = "memory_tracking")]
use std::sync::atomic::Ordering;

#[cfg(feature = "memory_tracking")]
#[rustler::nif]
fn get_rust_memory() -> usize {
    tracking::ALLOCATED.load(Ordering::SeqCst)
}

#[cfg(feature = "memory_tracking")]
#[rustler::nif]
fn get_rust_memory_peak() -> usize {
    tracking::PEAK_ALLOCATED.load(Ordering::SeqCst)
}

#[cfg(feature = "memory_tracking")]
#[rustler::nif]
fn reset_rust_memory_stats() -> (usize, usize) {
    let current = tracking::ALLOCATED.load(Ordering::SeqCst);
    let peak = tracking::PEAK_ALLOCATED.swap(current, Ordering::SeqCst);
    (current, peak)
}

#[cfg(not(feature = "memory_tracking"))]
#[rustler::nif]
fn get_rust_memory() -> usize {
    0
}

#[cfg(not(feature = "memory_tracking"))]
#[rustler::nif]
fn get_rust_memory_peak() -> usize {
    0
}

#[cfg(not(feature = "memory_tracking"))]
#[rustler::nif]
fn reset_rust_memory_stats() -> (usize, usize) {
    (0, 0)
}

// ============================================================================
// Document Lifecycle
// ============================================================================

fn lock_failed(reason: &'static str) -> rustler::Error {
    rustler::Error::RaiseAtom(reason)
}

fn new_ref(doc: XmlDocument) -> DocumentRef {
    ResourceArc::new(DocumentResource::new(doc))
}

/// Create a document holding a single empty root element
#[rustler::nif]
fn new_document(root: &str) -> DocumentRef {
    new_ref(XmlDocument::new(root))
}

/// Build a document from an element term (returns {:ok, doc} or {:error, reason})
#[rustler::nif]
fn from_term<'a>(env: Env<'a>, root: Term<'a>) -> Term<'a> {
    let doc = term::term_to_spec(root).and_then(|spec| dom::build_document(&spec));
    result_to_term(env, doc.map(new_ref))
}

/// Root element as an element term, or nil when the root was deleted
#[rustler::nif]
fn to_term<'a>(env: Env<'a>, doc_ref: DocumentRef) -> NifResult<Term<'a>> {
    doc_ref
        .with_doc(|doc| node_to_term(env, doc, DOCUMENT_NODE))
        .map_err(lock_failed)
}

/// Any node (attached or orphaned) as a term
#[rustler::nif]
fn node_term<'a>(env: Env<'a>, doc_ref: DocumentRef, node: NodeId) -> NifResult<Term<'a>> {
    doc_ref
        .with_doc(|doc| node_to_term(env, doc, node))
        .map_err(lock_failed)
}

/// Serialize the document to XML text
#[rustler::nif]
fn to_xml(doc_ref: DocumentRef, declaration: bool) -> NifResult<String> {
    let options = WriteOptions { declaration };
    doc_ref
        .with_doc(|doc| dom::write_document(doc, &options))
        .map_err(lock_failed)
}

/// Serialize one node and its subtree to XML text
#[rustler::nif]
fn node_to_xml(doc_ref: DocumentRef, node: NodeId) -> NifResult<String> {
    doc_ref
        .with_doc(|doc| dom::write_node(doc, node))
        .map_err(lock_failed)
}

// ============================================================================
// Queries
// ============================================================================

#[rustler::nif]
fn root(doc_ref: DocumentRef) -> NifResult<Option<NodeId>> {
    doc_ref
        .with_doc(XmlDocument::root_element_id)
        .map_err(lock_failed)
}

/// Elements named `tag` below `scope` (nil = whole document) in document order
#[rustler::nif]
fn find_all(doc_ref: DocumentRef, scope: Option<NodeId>, tag: &str) -> NifResult<Vec<NodeId>> {
    doc_ref
        .with_doc(|doc| editor::find_all(doc, scope.unwrap_or(DOCUMENT_NODE), tag))
        .map_err(lock_failed)
}

#[rustler::nif]
fn tag_exists(doc_ref: DocumentRef, tag: &str) -> NifResult<bool> {
    doc_ref
        .with_doc(|doc| editor::exists(doc, tag))
        .map_err(lock_failed)
}

/// Value of the first `tag` below `node`; nil when `node` is nil or nothing matches
#[rustler::nif]
fn get_tag_value(doc_ref: DocumentRef, node: Option<NodeId>, tag: &str) -> NifResult<Option<String>> {
    doc_ref
        .with_doc(|doc| editor::get_tag_value(doc, node, tag))
        .map_err(lock_failed)
}

#[rustler::nif]
fn get_tag_values(doc_ref: DocumentRef, node: NodeId, tag: &str) -> NifResult<Vec<Option<String>>> {
    doc_ref
        .with_doc(|doc| editor::get_tag_values(doc, node, tag))
        .map_err(lock_failed)
}

// ============================================================================
// Edits
// ============================================================================

#[rustler::nif]
fn set_attribute<'a>(
    env: Env<'a>,
    doc_ref: DocumentRef,
    node: NodeId,
    name: &str,
    value: &str,
) -> NifResult<Term<'a>> {
    doc_ref
        .with_doc_mut(|doc| result_to_term(env, editor::set_attribute(doc, node, name, value)))
        .map_err(lock_failed)
}

/// Returns {:ok, updated_count}
#[rustler::nif]
fn replace_tag_value<'a>(env: Env<'a>, doc_ref: DocumentRef, tag: &str, value: &str) -> NifResult<Term<'a>> {
    doc_ref
        .with_doc_mut(|doc| result_to_term(env, editor::replace_tag_value(doc, tag, value)))
        .map_err(lock_failed)
}

/// Returns {:ok, {node, :attached | :orphaned}}
#[rustler::nif]
fn insert_new_tag_below<'a>(
    env: Env<'a>,
    doc_ref: DocumentRef,
    append_to: &str,
    tag: &str,
    value: &str,
) -> NifResult<Term<'a>> {
    doc_ref
        .with_doc_mut(|doc| match editor::insert_new_tag_below(doc, append_to, tag, value) {
            Ok(inserted) => (rustler::types::atom::ok(), inserted_to_term(env, &inserted)).encode(env),
            Err(e) => error_to_term(env, &e),
        })
        .map_err(lock_failed)
}

/// Returns {:ok, node}; a nil value creates an empty element
#[rustler::nif]
fn insert_tag_value<'a>(
    env: Env<'a>,
    doc_ref: DocumentRef,
    tag: &str,
    value: Option<&str>,
) -> NifResult<Term<'a>> {
    doc_ref
        .with_doc_mut(|doc| result_to_term(env, editor::insert_tag_value(doc, tag, value)))
        .map_err(lock_failed)
}

/// Returns {:ok, node}; a nil value is rejected with {:error, reason}
#[rustler::nif]
fn insert_tag_in_element<'a>(
    env: Env<'a>,
    doc_ref: DocumentRef,
    parent: NodeId,
    tag: &str,
    value: Option<&str>,
) -> NifResult<Term<'a>> {
    doc_ref
        .with_doc_mut(|doc| result_to_term(env, editor::insert_tag_in_element(doc, parent, tag, value)))
        .map_err(lock_failed)
}

/// Returns {:ok, {:updated, count}} or {:ok, {:inserted, node}}
#[rustler::nif]
fn insert_or_update_tag_value<'a>(
    env: Env<'a>,
    doc_ref: DocumentRef,
    tag: &str,
    value: &str,
) -> NifResult<Term<'a>> {
    doc_ref
        .with_doc_mut(|doc| match editor::insert_or_update_tag_value(doc, tag, value) {
            Ok(upsert) => (rustler::types::atom::ok(), upsert_to_term(env, &upsert)).encode(env),
            Err(e) => error_to_term(env, &e),
        })
        .map_err(lock_failed)
}

/// Returns {:ok, removed_count}
#[rustler::nif]
fn delete_tag<'a>(env: Env<'a>, doc_ref: DocumentRef, tag: &str) -> NifResult<Term<'a>> {
    doc_ref
        .with_doc_mut(|doc| result_to_term(env, editor::delete_tag(doc, tag)))
        .map_err(lock_failed)
}

// ============================================================================
// NIF Initialization
// ============================================================================

rustler::init!("Elixir.TagEdit.Native");
