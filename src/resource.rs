//! ResourceArc Wrappers
//!
//! Persistent, editable documents shared with the BEAM.

use crate::dom::XmlDocument;
use rustler::ResourceArc;
use std::sync::Mutex;

/// Wrapper for XmlDocument that can be stored in a ResourceArc
///
/// The mutex serializes edits coming from concurrent BEAM processes
/// holding the same reference.
pub struct DocumentResource {
    pub doc: Mutex<XmlDocument>,
}

impl DocumentResource {
    pub fn new(doc: XmlDocument) -> Self {
        DocumentResource {
            doc: Mutex::new(doc),
        }
    }

    /// Run `f` with shared access to the document.
    ///
    /// # Errors
    ///
    /// Returns `"mutex_poisoned"` if the document mutex is poisoned.
    pub fn with_doc<F, R>(&self, f: F) -> Result<R, &'static str>
    where
        F: FnOnce(&XmlDocument) -> R,
    {
        let guard = self.doc.lock().map_err(|_| "mutex_poisoned")?;
        Ok(f(&guard))
    }

    /// Run `f` with exclusive access to the document.
    ///
    /// # Errors
    ///
    /// Returns `"mutex_poisoned"` if the document mutex is poisoned.
    pub fn with_doc_mut<F, R>(&self, f: F) -> Result<R, &'static str>
    where
        F: FnOnce(&mut XmlDocument) -> R,
    {
        let mut guard = self.doc.lock().map_err(|_| "mutex_poisoned")?;
        Ok(f(&mut guard))
    }
}

#[rustler::resource_impl]
impl rustler::Resource for DocumentResource {}

impl Default for DocumentResource {
    fn default() -> Self {
        DocumentResource::new(XmlDocument::empty())
    }
}

/// Type alias for document ResourceArc
pub type DocumentRef = ResourceArc<DocumentResource>;
