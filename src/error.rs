//! Error types for tree edits.
//!
//! Lookups that find nothing are not errors: they return `None` or an
//! empty `Vec`. Only broken preconditions and broken tree invariants
//! surface here.

use crate::dom::NodeId;

/// Error type for document edit operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// A caller-supplied argument violates the operation's contract.
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A node expected to be attached has no parent.
    #[error("Node {0} has no parent")]
    MissingParent(NodeId),

    /// A node passed as a child is not linked under the given parent.
    #[error("Node {child} is not a child of node {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// The handle does not refer to a node in this document.
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),

    /// The handle refers to a node that is not an element.
    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    /// The handle refers to a node that cannot hold children.
    #[error("Node {0} cannot have children")]
    NotAContainer(NodeId),

    /// The document has no root element to append under.
    #[error("Document has no root element")]
    MissingRootElement,

    /// A host term could not be decoded into a tree.
    #[error("Invalid document term: {0}")]
    InvalidTerm(String),
}

/// Result type alias for edit operations.
pub type Result<T> = std::result::Result<T, EditError>;
