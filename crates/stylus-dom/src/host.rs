//! The `HostDocument` trait: everything the injector needs from a page.
//!
//! Implementations wrap a live document (a browser binding, a headless
//! renderer) or, for embedding and tests, [`MemoryDocument`](crate::MemoryDocument).
//! All lookups work on the *connected* tree, i.e. nodes reachable from the
//! current document element; detached nodes keep their handles and state.

use crate::error::Result;
use crate::node::{DocumentKind, MutationRecord, Namespace, NodeId};

/// Document operations used by the style injector
pub trait HostDocument {
    /// Broad document type
    fn kind(&self) -> DocumentKind;

    /// The document's own URL
    fn url(&self) -> String;

    /// URL of the embedding frame, when there is one and it is readable
    fn parent_url(&self) -> Option<String>;

    /// The current root element
    fn document_element(&self) -> Option<NodeId>;

    /// The `head` element under the root, if present
    fn head(&self) -> Option<NodeId>;

    /// First child of `node`
    fn first_child(&self, node: NodeId) -> Option<NodeId>;

    /// Local name of an element
    fn local_name(&self, node: NodeId) -> Option<String>;

    /// Namespace of an element
    fn namespace(&self, node: NodeId) -> Option<Namespace>;

    /// Create a detached element in the document's default namespace
    fn create_element(&mut self, local_name: &str) -> NodeId;

    /// Create a detached element in an explicit namespace
    fn create_element_ns(&mut self, namespace: Namespace, local_name: &str) -> NodeId;

    /// The element's `id`
    fn element_id(&self, node: NodeId) -> Option<String>;

    /// Set the element's `id`
    fn set_element_id(&mut self, node: NodeId, id: &str) -> Result<()>;

    /// Set the element's class list from a space separated string
    fn set_class_name(&mut self, node: NodeId, class_name: &str) -> Result<()>;

    /// Whether the element's class list contains `class`
    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Set an arbitrary attribute
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()>;

    /// Read an arbitrary attribute
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Replace the element's text content
    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<()>;

    /// The element's text content
    fn text_content(&self, node: NodeId) -> Option<String>;

    /// Toggle the rendering state of a style element's sheet
    fn set_disabled(&mut self, node: NodeId, disabled: bool) -> Result<()>;

    /// Rendering state of a style element's sheet
    fn is_disabled(&self, node: NodeId) -> Option<bool>;

    /// Append `child` as the last child of `parent`, detaching it first
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()>;

    /// Detach `node` from its parent. Detached nodes are left untouched.
    fn remove(&mut self, node: NodeId) -> Result<()>;

    /// First connected element with the given id, in tree order
    fn get_element_by_id(&self, id: &str) -> Option<NodeId>;

    /// Connected elements named `local_name` carrying `class`, in tree order
    fn elements_by_class(&self, local_name: &str, class: &str) -> Vec<NodeId>;

    /// Whether `node` is reachable from the document element
    fn is_connected(&self, node: NodeId) -> bool;

    /// Copy `node` (and its subtree when `deep`) into a new detached node
    /// owned by this document
    fn import_node(&mut self, node: NodeId, deep: bool) -> Result<NodeId>;

    /// Whether the host can deliver child-list mutation records
    fn supports_mutation_observer(&self) -> bool {
        true
    }

    /// Start recording child-list changes of the document node
    fn observe_child_list(&mut self);

    /// Stop recording and drop queued records
    fn disconnect_observer(&mut self);

    /// Drain records queued since the last call
    fn take_mutation_records(&mut self) -> Vec<MutationRecord>;

    /// Dispatch a page-level custom signal
    fn dispatch_signal(&mut self, name: &str);

    /// Register interest in a page-level custom signal
    fn add_signal_listener(&mut self, name: &str);

    /// Drop interest in a page-level custom signal
    fn remove_signal_listener(&mut self, name: &str);
}
