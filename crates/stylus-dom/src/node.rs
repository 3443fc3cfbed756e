//! Node handles and the small value types shared by every document backend.

use std::fmt;

/// Opaque handle to a node owned by a document.
///
/// Handles stay valid while a node is detached, so a caller can set an
/// element aside and attach it again later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Create a handle from a raw backend index
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// The raw backend index
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Broad document type, as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Regular markup document
    Html,
    /// Any XML document, including SVG documents
    Xml,
}

/// Element namespaces the injector cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// No namespace (plain XML vocabularies)
    None,
    /// `http://www.w3.org/1999/xhtml`
    Xhtml,
    /// `http://www.w3.org/2000/svg`
    Svg,
}

impl Namespace {
    /// The namespace URI, if any
    pub fn uri(self) -> Option<&'static str> {
        match self {
            Namespace::None => None,
            Namespace::Xhtml => Some("http://www.w3.org/1999/xhtml"),
            Namespace::Svg => Some("http://www.w3.org/2000/svg"),
        }
    }
}

/// A batch of child-list changes observed directly under the document node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationRecord {
    /// Nodes that became children of the document
    pub added: Vec<NodeId>,
    /// Nodes that stopped being children of the document
    pub removed: Vec<NodeId>,
}
