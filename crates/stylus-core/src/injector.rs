//! Injector
//!
//! Creates style elements for a document, attaches them under the current
//! style root and toggles their rendering state. All document-visible effects
//! of the engine go through here.

use stylus_dom::{HostDocument, Namespace, NodeId, XML_VIEWER_STYLE_ID};
use stylus_protocol::{Section, StyleId, joined_code};
use tracing::{debug, trace};

use crate::Result;
use crate::config::EngineConfig;

/// Which kind of style element a document needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleFlavor {
    /// Root is `<svg>`: an SVG-namespaced style element
    Svg,
    /// Other XML documents: an XHTML-namespaced style element
    Xml,
    /// Markup documents: a plain `style` element. Also styles inline SVG.
    Html,
}

impl StyleFlavor {
    pub fn detect<D: HostDocument>(doc: &D) -> Self {
        let svg_root = doc.document_element().is_some_and(|root| {
            doc.namespace(root) == Some(Namespace::Svg)
                && doc.local_name(root).as_deref() == Some("svg")
        });
        if svg_root {
            StyleFlavor::Svg
        } else if doc.kind() == stylus_dom::DocumentKind::Xml {
            StyleFlavor::Xml
        } else {
            StyleFlavor::Html
        }
    }
}

/// The browser XML viewer renders injected elements under the root as text,
/// so styles go into the head it generates instead.
pub fn xml_viewer_head<D: HostDocument>(doc: &D) -> Option<NodeId> {
    let head = doc.head()?;
    let first = doc.first_child(head)?;
    (doc.element_id(first).as_deref() == Some(XML_VIEWER_STYLE_ID)).then_some(head)
}

/// Where styles belong in `doc` right now
pub fn expected_root<D: HostDocument>(doc: &D) -> Option<NodeId> {
    xml_viewer_head(doc).or_else(|| doc.document_element())
}

/// Creates, attaches and toggles injected style elements
#[derive(Debug)]
pub struct Injector {
    id_prefix: String,
    marker_class: String,
    root: Option<NodeId>,
    disable_all: bool,
}

impl Injector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            id_prefix: config.id_prefix.clone(),
            marker_class: config.marker_class.clone(),
            root: None,
            disable_all: false,
        }
    }

    /// The node styles are appended to
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }

    /// Switch to the XML viewer head when present, and pick up a root that
    /// did not exist when the engine started
    pub fn refresh_root<D: HostDocument>(&mut self, doc: &D) {
        if let Some(head) = xml_viewer_head(doc) {
            self.root = Some(head);
        } else if self.root.is_none() {
            self.root = doc.document_element();
        }
    }

    /// Current value of the global disable flag
    pub fn disable_all(&self) -> bool {
        self.disable_all
    }

    /// Build a detached style element for `id` carrying the sections' code
    pub fn create_element_for<D: HostDocument>(
        &self,
        doc: &mut D,
        id: &StyleId,
        sections: &[Section],
    ) -> Result<NodeId> {
        let element = match StyleFlavor::detect(doc) {
            StyleFlavor::Svg => doc.create_element_ns(Namespace::Svg, "style"),
            StyleFlavor::Xml => doc.create_element_ns(Namespace::Xhtml, "style"),
            StyleFlavor::Html => doc.create_element("style"),
        };
        doc.set_element_id(element, &format!("{}{}", self.id_prefix, id))?;
        doc.set_class_name(element, &self.marker_class)?;
        doc.set_attribute(element, "type", "text/css")?;
        doc.set_text_content(element, &joined_code(sections))?;
        Ok(element)
    }

    /// Append `element` to the style root unless an element with its id is
    /// already in the document. Returns whether it was appended.
    pub fn attach<D: HostDocument>(&self, doc: &mut D, element: NodeId) -> Result<bool> {
        let Some(root) = self.root else {
            debug!(%element, "no style root yet, attach skipped");
            return Ok(false);
        };
        if let Some(id) = doc.element_id(element)
            && doc.get_element_by_id(&id).is_some()
        {
            trace!(%id, "element already in document");
            return Ok(false);
        }
        doc.append_child(root, element)?;
        doc.set_disabled(element, self.disable_all)?;
        Ok(true)
    }

    /// Every style element in the document that belongs to this engine
    pub fn injected_elements<D: HostDocument>(&self, doc: &D) -> Vec<NodeId> {
        doc.elements_by_class("style", &self.marker_class)
            .into_iter()
            .filter(|el| {
                doc.element_id(*el)
                    .is_some_and(|id| id.starts_with(&self.id_prefix))
            })
            .collect()
    }

    /// Apply the global disable flag to every injected element. Returns
    /// `false` without touching anything when the flag is unchanged.
    pub fn set_global_disable<D: HostDocument>(&mut self, doc: &mut D, disable: bool) -> Result<bool> {
        if disable == self.disable_all {
            return Ok(false);
        }
        self.disable_all = disable;
        for element in self.injected_elements(doc) {
            if doc.is_disabled(element) != Some(disable) {
                doc.set_disabled(element, disable)?;
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stylus_dom::MemoryDocument;

    fn injector_for(doc: &MemoryDocument) -> Injector {
        let mut injector = Injector::new(&EngineConfig::default());
        injector.refresh_root(doc);
        injector
    }

    #[test]
    fn test_flavor_detection() {
        assert_eq!(StyleFlavor::detect(&MemoryDocument::html("https://a.test/")), StyleFlavor::Html);
        assert_eq!(StyleFlavor::detect(&MemoryDocument::xml("https://a.test/", "feed")), StyleFlavor::Xml);
        assert_eq!(StyleFlavor::detect(&MemoryDocument::svg("https://a.test/")), StyleFlavor::Svg);
    }

    #[test]
    fn test_element_content_and_marker() {
        let mut doc = MemoryDocument::html("https://a.test/");
        let injector = injector_for(&doc);
        let el = injector
            .create_element_for(
                &mut doc,
                &StyleId::from(4),
                &[Section::new("a{}"), Section::new("b{}")],
            )
            .unwrap();

        assert_eq!(doc.element_id(el).as_deref(), Some("stylus-4"));
        assert!(doc.has_class(el, "stylus"));
        assert_eq!(doc.attribute(el, "type").as_deref(), Some("text/css"));
        assert_eq!(doc.text_content(el).as_deref(), Some("a{}\nb{}"));
    }

    #[test]
    fn test_attach_is_idempotent_by_id() {
        let mut doc = MemoryDocument::html("https://a.test/");
        let injector = injector_for(&doc);
        let id = StyleId::from(1);
        let first = injector.create_element_for(&mut doc, &id, &[]).unwrap();
        let second = injector.create_element_for(&mut doc, &id, &[]).unwrap();

        assert!(injector.attach(&mut doc, first).unwrap());
        assert!(!injector.attach(&mut doc, second).unwrap());
        assert_eq!(injector.injected_elements(&doc), vec![first]);
    }

    #[test]
    fn test_attach_without_root_is_skipped() {
        let mut doc = MemoryDocument::empty(stylus_dom::DocumentKind::Html, "https://a.test/");
        let injector = injector_for(&doc);
        let el = injector
            .create_element_for(&mut doc, &StyleId::from(1), &[])
            .unwrap();
        assert!(!injector.attach(&mut doc, el).unwrap());
    }

    #[test]
    fn test_xml_viewer_uses_head() {
        let doc = MemoryDocument::xml_viewer("https://a.test/data.xml");
        let injector = injector_for(&doc);
        assert_eq!(injector.root(), doc.head());
    }

    #[test]
    fn test_global_disable_only_on_change() {
        let mut doc = MemoryDocument::html("https://a.test/");
        let mut injector = injector_for(&doc);
        let el = injector
            .create_element_for(&mut doc, &StyleId::from(1), &[])
            .unwrap();
        injector.attach(&mut doc, el).unwrap();

        assert!(injector.set_global_disable(&mut doc, true).unwrap());
        assert_eq!(doc.is_disabled(el), Some(true));
        assert!(!injector.set_global_disable(&mut doc, true).unwrap());
        assert!(injector.set_global_disable(&mut doc, false).unwrap());
        assert_eq!(doc.is_disabled(el), Some(false));
    }
}
