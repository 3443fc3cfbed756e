//! In-memory document
//!
//! `MemoryDocument` is a small arena-backed element tree implementing
//! [`HostDocument`]. Handles are cheap clones sharing one tree, so an engine
//! can own one handle while page scripts (or tests) keep another and rewrite
//! the document underneath it.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::host::HostDocument;
use crate::node::{DocumentKind, MutationRecord, Namespace, NodeId};

/// Id of the style element the XML viewer places first in its generated head
pub const XML_VIEWER_STYLE_ID: &str = "xml-viewer-style";

#[derive(Debug, Clone)]
struct NodeData {
    local_name: String,
    namespace: Namespace,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    text: String,
    disabled: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn new(namespace: Namespace, local_name: &str) -> Self {
        Self {
            local_name: local_name.to_string(),
            namespace,
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            text: String::new(),
            disabled: false,
            parent: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct Inner {
    kind: DocumentKind,
    url: String,
    parent_url: Option<String>,
    nodes: Vec<NodeData>,
    document_element: Option<NodeId>,
    observer_supported: bool,
    observing: bool,
    records: Vec<MutationRecord>,
    listeners: HashMap<String, usize>,
    dispatched: Vec<String>,
}

impl Inner {
    fn new(kind: DocumentKind, url: &str) -> Self {
        Self {
            kind,
            url: url.to_string(),
            parent_url: None,
            nodes: Vec::new(),
            document_element: None,
            observer_supported: true,
            observing: false,
            records: Vec::new(),
            listeners: HashMap::new(),
            dispatched: Vec::new(),
        }
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(data);
        NodeId::from_index(self.nodes.len() - 1)
    }

    fn node(&self, id: NodeId) -> Result<&NodeData> {
        self.nodes
            .get(id.index())
            .ok_or(Error::NodeNotFound { node: id })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        self.nodes
            .get_mut(id.index())
            .ok_or(Error::NodeNotFound { node: id })
    }

    fn element(&mut self, namespace: Namespace, local_name: &str) -> NodeId {
        self.alloc(NodeData::new(namespace, local_name))
    }

    fn append(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(Error::HierarchyRequest {
                reason: format!("cannot append {} into its own subtree", child),
            });
        }
        self.detach(child)?;
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    fn detach(&mut self, node: NodeId) -> Result<()> {
        let Some(parent) = self.node(node)?.parent else {
            return Ok(());
        };
        self.node_mut(parent)?.children.retain(|c| *c != node);
        self.node_mut(node)?.parent = None;
        Ok(())
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id.index()).and_then(|n| n.parent);
        }
        false
    }

    fn connected(&self, node: NodeId) -> bool {
        match self.document_element {
            Some(root) => self.is_inclusive_ancestor(root, node),
            None => false,
        }
    }

    /// Connected nodes in tree order
    fn tree_order(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.document_element.into_iter().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.nodes.get(id.index()) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn clone_subtree(&mut self, source: NodeId, deep: bool) -> Result<NodeId> {
        let mut data = self.node(source)?.clone();
        let children = std::mem::take(&mut data.children);
        data.parent = None;
        if !deep {
            data.text.clear();
        }
        let copy = self.alloc(data);
        if deep {
            for child in children {
                let child_copy = self.clone_subtree(child, true)?;
                self.append(copy, child_copy)?;
            }
        }
        Ok(copy)
    }

    /// Build a fresh root shaped like the initial one for this document
    fn build_root(&mut self, namespace: Namespace, local_name: &str) -> NodeId {
        let root = self.element(namespace, local_name);
        if local_name == "html" {
            let head = self.element(namespace, "head");
            let body = self.element(namespace, "body");
            // Both nodes were just created, so appending cannot fail.
            let _ = self.append(root, head);
            let _ = self.append(root, body);
        }
        root
    }

    fn swap_root(&mut self, record: bool) -> NodeId {
        let (namespace, local_name) = match self.document_element.and_then(|r| self.node(r).ok()) {
            Some(old) => (old.namespace, old.local_name.clone()),
            None => (Namespace::Xhtml, "html".to_string()),
        };
        let new_root = self.build_root(namespace, &local_name);
        let old_root = self.document_element.replace(new_root);
        if record && self.observing {
            self.records.push(MutationRecord {
                added: vec![new_root],
                removed: old_root.into_iter().collect(),
            });
        }
        tracing::trace!(?old_root, ?new_root, "document element replaced");
        new_root
    }

    fn markup(&self, node: NodeId, out: &mut String) {
        let Ok(data) = self.node(node) else {
            return;
        };
        out.push('<');
        out.push_str(&data.local_name);
        if let Some(id) = &data.id {
            out.push_str(&format!(" id=\"{}\"", id));
        }
        if !data.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", data.classes.join(" ")));
        }
        for (name, value) in &data.attributes {
            out.push_str(&format!(" {}=\"{}\"", name, value));
        }
        if data.disabled {
            out.push_str(" disabled");
        }
        out.push('>');
        out.push_str(&data.text);
        for child in &data.children {
            self.markup(*child, out);
        }
        out.push_str(&format!("</{}>", data.local_name));
    }
}

/// Shared handle to an in-memory document
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryDocument {
    fn from_inner(inner: Inner) -> Self {
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    /// A markup document: `<html><head></head><body></body></html>`
    pub fn html(url: &str) -> Self {
        let mut inner = Inner::new(DocumentKind::Html, url);
        let root = inner.build_root(Namespace::Xhtml, "html");
        inner.document_element = Some(root);
        Self::from_inner(inner)
    }

    /// A generic XML document with a single root element in no namespace
    pub fn xml(url: &str, root_name: &str) -> Self {
        let mut inner = Inner::new(DocumentKind::Xml, url);
        let root = inner.build_root(Namespace::None, root_name);
        inner.document_element = Some(root);
        Self::from_inner(inner)
    }

    /// A standalone SVG document
    pub fn svg(url: &str) -> Self {
        let mut inner = Inner::new(DocumentKind::Xml, url);
        let root = inner.build_root(Namespace::Svg, "svg");
        inner.document_element = Some(root);
        Self::from_inner(inner)
    }

    /// An XML document rendered by the browser's XML viewer, whose generated
    /// head starts with the viewer's own style element
    pub fn xml_viewer(url: &str) -> Self {
        let mut inner = Inner::new(DocumentKind::Xml, url);
        let root = inner.build_root(Namespace::Xhtml, "html");
        inner.document_element = Some(root);
        let head = inner.nodes[root.index()].children[0];
        let style = inner.element(Namespace::Xhtml, "style");
        inner.nodes[style.index()].id = Some(XML_VIEWER_STYLE_ID.to_string());
        let _ = inner.append(head, style);
        Self::from_inner(inner)
    }

    /// A document with no root element yet
    pub fn empty(kind: DocumentKind, url: &str) -> Self {
        Self::from_inner(Inner::new(kind, url))
    }

    /// Set the embedding frame's URL
    pub fn with_parent_url(self, url: &str) -> Self {
        self.inner.borrow_mut().parent_url = Some(url.to_string());
        self
    }

    /// Pretend the host has no mutation observer API
    pub fn without_mutation_observer(self) -> Self {
        self.inner.borrow_mut().observer_supported = false;
        self
    }

    /// Change the document URL (navigation inside a frame, `about:srcdoc`)
    pub fn set_url(&self, url: &str) {
        self.inner.borrow_mut().url = url.to_string();
    }

    /// Install a root element on a document created with [`MemoryDocument::empty`]
    /// or replace the current one, the way a page script rewriting the
    /// document does. The change is visible to a child-list observer.
    pub fn replace_document_element(&self) -> NodeId {
        self.inner.borrow_mut().swap_root(true)
    }

    /// Replace the root element without producing mutation records, the way
    /// an embedding frame rewriting the document from outside does
    pub fn replace_document_element_unobserved(&self) -> NodeId {
        self.inner.borrow_mut().swap_root(false)
    }

    /// The `body` element under the root, if present
    pub fn body(&self) -> Option<NodeId> {
        let inner = self.inner.borrow();
        let root = inner.document_element?;
        inner
            .node(root)
            .ok()?
            .children
            .iter()
            .copied()
            .find(|c| inner.node(*c).map(|n| n.local_name == "body").unwrap_or(false))
    }

    /// Whether a child-list observer is currently connected
    pub fn is_observing(&self) -> bool {
        self.inner.borrow().observing
    }

    /// Number of listeners registered for a page signal
    pub fn listener_count(&self, name: &str) -> usize {
        self.inner.borrow().listeners.get(name).copied().unwrap_or(0)
    }

    /// Every signal dispatched so far, in order
    pub fn dispatched_signals(&self) -> Vec<String> {
        self.inner.borrow().dispatched.clone()
    }

    /// Serialize the connected tree
    pub fn to_markup(&self) -> String {
        let inner = self.inner.borrow();
        let mut out = String::new();
        if let Some(root) = inner.document_element {
            inner.markup(root, &mut out);
        }
        out
    }
}

impl HostDocument for MemoryDocument {
    fn kind(&self) -> DocumentKind {
        self.inner.borrow().kind
    }

    fn url(&self) -> String {
        self.inner.borrow().url.clone()
    }

    fn parent_url(&self) -> Option<String> {
        self.inner.borrow().parent_url.clone()
    }

    fn document_element(&self) -> Option<NodeId> {
        self.inner.borrow().document_element
    }

    fn head(&self) -> Option<NodeId> {
        let inner = self.inner.borrow();
        let root = inner.document_element?;
        inner
            .node(root)
            .ok()?
            .children
            .iter()
            .copied()
            .find(|c| inner.node(*c).map(|n| n.local_name == "head").unwrap_or(false))
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.inner.borrow().node(node).ok()?.children.first().copied()
    }

    fn local_name(&self, node: NodeId) -> Option<String> {
        self.inner
            .borrow()
            .node(node)
            .ok()
            .map(|n| n.local_name.clone())
    }

    fn namespace(&self, node: NodeId) -> Option<Namespace> {
        self.inner.borrow().node(node).ok().map(|n| n.namespace)
    }

    fn create_element(&mut self, local_name: &str) -> NodeId {
        let mut inner = self.inner.borrow_mut();
        let namespace = match inner.kind {
            DocumentKind::Html => Namespace::Xhtml,
            DocumentKind::Xml => Namespace::None,
        };
        inner.element(namespace, local_name)
    }

    fn create_element_ns(&mut self, namespace: Namespace, local_name: &str) -> NodeId {
        self.inner.borrow_mut().element(namespace, local_name)
    }

    fn element_id(&self, node: NodeId) -> Option<String> {
        self.inner.borrow().node(node).ok()?.id.clone()
    }

    fn set_element_id(&mut self, node: NodeId, id: &str) -> Result<()> {
        self.inner.borrow_mut().node_mut(node)?.id = Some(id.to_string());
        Ok(())
    }

    fn set_class_name(&mut self, node: NodeId, class_name: &str) -> Result<()> {
        self.inner.borrow_mut().node_mut(node)?.classes =
            class_name.split_whitespace().map(str::to_string).collect();
        Ok(())
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.inner
            .borrow()
            .node(node)
            .map(|n| n.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.inner
            .borrow_mut()
            .node_mut(node)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.inner.borrow().node(node).ok()?.attributes.get(name).cloned()
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        let children = std::mem::take(&mut inner.node_mut(node)?.children);
        for child in children {
            inner.node_mut(child)?.parent = None;
        }
        inner.node_mut(node)?.text = text.to_string();
        Ok(())
    }

    fn text_content(&self, node: NodeId) -> Option<String> {
        let inner = self.inner.borrow();
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let data = inner.node(id).ok()?;
            out.push_str(&data.text);
            stack.extend(data.children.iter().rev().copied());
        }
        Some(out)
    }

    fn set_disabled(&mut self, node: NodeId, disabled: bool) -> Result<()> {
        self.inner.borrow_mut().node_mut(node)?.disabled = disabled;
        Ok(())
    }

    fn is_disabled(&self, node: NodeId) -> Option<bool> {
        self.inner.borrow().node(node).ok().map(|n| n.disabled)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.inner.borrow_mut().append(parent, child)
    }

    fn remove(&mut self, node: NodeId) -> Result<()> {
        self.inner.borrow_mut().detach(node)
    }

    fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let inner = self.inner.borrow();
        inner
            .tree_order()
            .into_iter()
            .find(|n| inner.nodes[n.index()].id.as_deref() == Some(id))
    }

    fn elements_by_class(&self, local_name: &str, class: &str) -> Vec<NodeId> {
        let inner = self.inner.borrow();
        inner
            .tree_order()
            .into_iter()
            .filter(|n| {
                let data = &inner.nodes[n.index()];
                data.local_name == local_name && data.classes.iter().any(|c| c == class)
            })
            .collect()
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.inner.borrow().connected(node)
    }

    fn import_node(&mut self, node: NodeId, deep: bool) -> Result<NodeId> {
        self.inner.borrow_mut().clone_subtree(node, deep)
    }

    fn supports_mutation_observer(&self) -> bool {
        self.inner.borrow().observer_supported
    }

    fn observe_child_list(&mut self) {
        self.inner.borrow_mut().observing = true;
    }

    fn disconnect_observer(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.observing = false;
        inner.records.clear();
    }

    fn take_mutation_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.inner.borrow_mut().records)
    }

    fn dispatch_signal(&mut self, name: &str) {
        self.inner.borrow_mut().dispatched.push(name.to_string());
    }

    fn add_signal_listener(&mut self, name: &str) {
        *self
            .inner
            .borrow_mut()
            .listeners
            .entry(name.to_string())
            .or_insert(0) += 1;
    }

    fn remove_signal_listener(&mut self, name: &str) {
        let mut inner = self.inner.borrow_mut();
        if let Some(count) = inner.listeners.get_mut(name) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                inner.listeners.remove(name);
            }
        }
    }
}
