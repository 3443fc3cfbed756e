//! Error types for stylus-dom

use crate::node::NodeId;

/// Result type for stylus-dom operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by document operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The handle does not refer to a node of this document
    #[error("Node not found: {node}")]
    NodeNotFound { node: NodeId },

    /// The requested tree change would produce an invalid hierarchy
    #[error("Hierarchy request error: {reason}")]
    HierarchyRequest { reason: String },

    /// The document has no root element to work with
    #[error("Document has no root element")]
    NoRoot,
}
