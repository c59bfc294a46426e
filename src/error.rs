//! Error types for tree operations and declaration reading

use thiserror::Error;

use crate::dom::{NodeId, NodeKind};

/// Main error type for rustydom operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The id does not refer to a node in this document
    #[error("Node {0} does not exist")]
    NodeNotFound(NodeId),

    /// An insertion would break the tree shape
    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(&'static str),

    /// A reference node is not a child of the given parent
    #[error("Node {child} is not a child of node {parent}")]
    NotAChild {
        /// Expected parent
        parent: NodeId,
        /// Node that was not found among its children
        child: NodeId,
    },

    /// Only detached nodes can be released
    #[error("Node {id} is still a child of node {parent}")]
    StillAttached {
        /// Node that was passed
        id: NodeId,
        /// Its current parent
        parent: NodeId,
    },

    /// The operation needs a node of another kind
    #[error("Node {id} is not a {expected:?} node")]
    WrongKind {
        /// Node that was passed
        id: NodeId,
        /// Kind the operation works on
        expected: NodeKind,
    },

    /// A DOCTYPE declaration could not be read
    #[error("Invalid DOCTYPE declaration: {0}")]
    InvalidDeclaration(String),
}

/// Result type alias for rustydom operations
pub type Result<T> = std::result::Result<T, DomError>;
