//! [`Harness`]: an engine wired to a memory document, a recording runtime,
//! a manual clock and an in-memory controller.

use stylus_core::{Engine, EngineConfig, logging};
use stylus_dom::{HostDocument, MemoryDocument, NodeId};
use stylus_protocol::{Notification, Reply, StyleId, StyleResponse};

use crate::controller::Controller;
use crate::runtime::{FakeRuntime, ManualClock};

/// Page URL used by [`Harness::html`]
pub const PAGE_URL: &str = "https://example.test/page";

/// A started engine plus handles to everything around it
///
/// # Example
///
/// ```
/// use stylus_test_utils::Harness;
///
/// let mut h = Harness::html();
/// h.controller.put(1, &["a{color:red}"]);
/// h.serve();
/// assert_eq!(h.injected_ids(), vec!["stylus-1"]);
/// ```
pub struct Harness {
    pub engine: Engine<MemoryDocument, FakeRuntime>,
    pub doc: MemoryDocument,
    pub runtime: FakeRuntime,
    pub clock: ManualClock,
    pub controller: Controller,
}

impl Harness {
    /// Started engine on `doc` with the default config
    pub fn new(doc: MemoryDocument) -> Self {
        Self::with_config(EngineConfig::default(), doc)
    }

    /// Started engine on a regular markup page
    pub fn html() -> Self {
        Self::new(MemoryDocument::html(PAGE_URL))
    }

    /// Started engine on `doc` with `config`
    pub fn with_config(config: EngineConfig, doc: MemoryDocument) -> Self {
        let mut harness = Self::unstarted(config, doc);
        harness.engine.start();
        harness
    }

    /// Engine that has not sent its initial query yet
    pub fn unstarted(config: EngineConfig, doc: MemoryDocument) -> Self {
        // Another test in the same binary may have installed it already
        let _ = logging::init_for_tests();
        let runtime = FakeRuntime::new();
        let clock = ManualClock::new();
        let engine = Engine::with_clock(config, doc.clone(), runtime.clone(), clock.clone())
            .expect("harness config must be valid");
        Self {
            engine,
            doc,
            runtime,
            clock,
            controller: Controller::new(),
        }
    }

    /// Answer every outstanding query from the controller, including queries
    /// sent while answering
    pub fn serve(&mut self) {
        while let Some((request_id, request)) = self.runtime.pop_request() {
            let response = self.controller.answer(&request);
            self.engine.handle_styles(request_id, Some(response));
        }
    }

    /// Answer the oldest outstanding query with `response`
    pub fn respond(&mut self, response: Option<StyleResponse>) {
        let (request_id, _) = self
            .runtime
            .pop_request()
            .expect("no outstanding styles request");
        self.engine.handle_styles(request_id, response);
    }

    pub fn notify(&mut self, notification: Notification) -> Option<Reply> {
        self.engine.handle_message(notification)
    }

    /// Move the clock forward and fire due timers
    pub fn advance(&mut self, ms: u64) {
        self.clock.advance_ms(ms);
        self.engine.tick();
    }

    /// Ids of the injected style elements in the document, in tree order
    pub fn injected_ids(&self) -> Vec<String> {
        let prefix = &self.engine.config().id_prefix;
        self.doc
            .elements_by_class("style", &self.engine.config().marker_class)
            .into_iter()
            .filter_map(|el| self.doc.element_id(el))
            .filter(|id| id.starts_with(prefix.as_str()))
            .collect()
    }

    /// The attached element of style `id`
    pub fn element(&self, id: u64) -> Option<NodeId> {
        self.doc
            .get_element_by_id(&self.engine.config().element_id(&StyleId::from(id)))
    }

    /// The attached ghost of style `id`
    pub fn ghost(&self, id: u64) -> Option<NodeId> {
        self.doc
            .get_element_by_id(&self.engine.config().ghost_id(&StyleId::from(id)))
    }

    /// Text of the attached element of style `id`
    pub fn text(&self, id: u64) -> Option<String> {
        self.element(id).and_then(|el| self.doc.text_content(el))
    }

    /// Rendering state of the attached element of style `id`
    pub fn disabled(&self, id: u64) -> Option<bool> {
        self.element(id).and_then(|el| self.doc.is_disabled(el))
    }
}
