//! Engine implementation
//!
//! One `Engine` is attached to one document. It owns every piece of mutable
//! state (registry, injector, timers, watchdog, lifecycle guard) and is the
//! single entry point for inbound events:
//!
//! - [`Engine::handle_message`]: push notifications from the controller
//! - [`Engine::handle_styles`]: replies to the engine's own styles queries
//! - [`Engine::process_mutations`]: child-list changes of the document
//! - [`Engine::tick`]: timers whose deadline has passed
//! - [`Engine::handle_page_signal`]: the page-level liveness signal
//!
//! None of these return errors: failures are logged and dropped so nothing
//! propagates into the host page.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use stylus_dom::{HostDocument, NodeId};
use stylus_protocol::{
    GetStylesRequest, Notification, Reply, RequestId, StyleId, StyleResponse, StylesPayload,
};
use tracing::{debug, trace, warn};

use crate::config::EngineConfig;
use crate::injector::Injector;
use crate::lifecycle::LifecycleGuard;
use crate::registry::Registry;
use crate::runtime::{Clock, Runtime, SystemClock};
use crate::timers::{TimerId, TimerQueue, TimerTask};
use crate::watchdog::{Watchdog, WatchdogState};
use crate::{Error, Result};

/// URL schemes that can be matched against style rules directly
const MATCHABLE_SCHEMES: [&str; 4] = ["http", "file", "chrome", "ftp"];

/// Pages of the extension itself
const OWN_PAGE_SCHEME: &str = "chrome-extension:";

/// Lifecycle of an engine instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed, initial query not sent yet
    Created,
    /// Receiving and applying events
    Running,
    /// Shut down; every entry point is a no-op
    Disposed,
}

/// What the reply to an outstanding styles query should be used for
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingFetch {
    /// Apply the reply; the style it was restricted to, if any
    Apply(Option<StyleId>),
    ReplaceAll,
}

/// Style synchronization engine for one document
pub struct Engine<D: HostDocument, R: Runtime> {
    pub(crate) config: EngineConfig,
    pub(crate) document: D,
    pub(crate) runtime: R,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) injector: Injector,
    pub(crate) registry: Registry,
    pub(crate) timers: TimerQueue,
    pub(crate) watchdog: Watchdog,
    pub(crate) guard: LifecycleGuard,
    pub(crate) pending: HashMap<RequestId, PendingFetch>,
    pub(crate) ghost_sweep: Option<TimerId>,
    /// Retiring styles the controller answered without a replacement
    pub(crate) stale_ghosts: HashSet<StyleId>,
    pub(crate) state: EngineState,
}

impl<D: HostDocument, R: Runtime> Engine<D, R> {
    /// Create an engine using the wall clock
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: EngineConfig, document: D, runtime: R) -> Result<Self> {
        Self::with_clock(config, document, runtime, SystemClock)
    }

    /// Create an engine with an explicit clock
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_clock(
        config: EngineConfig,
        document: D,
        runtime: R,
        clock: impl Clock + 'static,
    ) -> Result<Self> {
        config.validate()?;
        let mut injector = Injector::new(&config);
        injector.set_root(document.document_element());

        Ok(Self {
            config,
            document,
            runtime,
            clock: Box::new(clock),
            injector,
            registry: Registry::new(),
            timers: TimerQueue::new(),
            watchdog: Watchdog::default(),
            guard: LifecycleGuard::default(),
            pending: HashMap::new(),
            ghost_sweep: None,
            stale_ghosts: HashSet::new(),
            state: EngineState::Created,
        })
    }

    /// Attach to the document: ask the controller for the current styles and
    /// arm the lifecycle guard. Calling it again has no effect.
    pub fn start(&mut self) {
        if self.state != EngineState::Created {
            return;
        }
        self.state = EngineState::Running;
        debug!(url = %self.document.url(), "engine starting");
        self.request_styles(None, PendingFetch::Apply(None));
        self.arm_guard();
    }

    /// Handle a push notification. Only `ping` produces a reply.
    pub fn handle_message(&mut self, notification: Notification) -> Option<Reply> {
        if self.ensure_running().is_err() {
            trace!(method = notification.method(), "ignoring message after shutdown");
            return None;
        }
        let method = notification.method();
        match self.dispatch(notification) {
            Ok(reply) => reply,
            Err(e) => {
                warn!(method, error = %e, "failed to apply message");
                None
            }
        }
    }

    fn dispatch(&mut self, notification: Notification) -> Result<Option<Reply>> {
        match notification {
            Notification::StyleDeleted { id } => self.delete(&id)?,
            Notification::StyleUpdated {
                style,
                code_is_updated,
            } => self.update(style, code_is_updated)?,
            Notification::StyleAdded { style } => self.style_added(style)?,
            Notification::StyleApply { styles } => match styles {
                StylesPayload::Diy => self.request_styles(None, PendingFetch::Apply(None)),
                StylesPayload::NotReady => self.apply_styles(None)?,
                StylesPayload::Styles(response) => self.apply_styles(Some(response))?,
            },
            Notification::StyleReplaceAll { styles } => match styles {
                StylesPayload::Diy | StylesPayload::NotReady => {
                    self.request_styles(None, PendingFetch::ReplaceAll)
                }
                StylesPayload::Styles(response) => self.replace_all(response)?,
            },
            Notification::PrefChanged { prefs } => {
                if let Some(disable) = prefs.disable_all {
                    self.set_global_disable(disable)?;
                }
            }
            Notification::Ping => return Ok(Some(Reply::Ack(true))),
            Notification::Unknown => trace!("ignoring unknown message"),
        }
        Ok(None)
    }

    /// Handle the reply to a styles query. `None` means the controller had
    /// nothing to answer with yet (still starting up).
    pub fn handle_styles(&mut self, request: RequestId, response: Option<StyleResponse>) {
        if self.ensure_running().is_err() {
            return;
        }
        let purpose = self
            .pending
            .remove(&request)
            .unwrap_or(PendingFetch::Apply(None));
        let result = match (purpose, response) {
            (PendingFetch::ReplaceAll, Some(response)) => self.replace_all(response),
            (PendingFetch::ReplaceAll, None) => {
                self.request_styles(None, PendingFetch::ReplaceAll);
                Ok(())
            }
            (PendingFetch::Apply(requested), response) => self.apply_reply(requested, response),
        };
        if let Err(e) = result {
            warn!(request, error = %e, "failed to apply styles");
        }
    }

    /// Run every timer whose deadline has passed
    pub fn tick(&mut self) {
        if self.ensure_running().is_err() {
            return;
        }
        let now = self.clock.now();
        while let Some((timer, task)) = self.timers.pop_due(now) {
            trace!(?timer, ?task, "timer fired");
            let result = match task {
                TimerTask::RetireGhost(id) => self.remove_ghost(&id),
                TimerTask::GhostSweep => {
                    self.ghost_sweep = None;
                    self.sweep_ghosts()
                }
                TimerTask::RootCheck => self.check_root(),
                TimerTask::PollRoot => self.poll_root(),
            };
            if let Err(e) = result {
                warn!(error = %e, "timer task failed");
            }
            if self.state == EngineState::Disposed {
                break;
            }
        }
    }

    /// Earliest pending timer deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            EngineState::Disposed => None,
            _ => self.timers.next_deadline(),
        }
    }

    pub(crate) fn ensure_running(&self) -> Result<()> {
        match self.state {
            EngineState::Disposed => Err(Error::Disposed),
            _ => Ok(()),
        }
    }

    pub(crate) fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Send a styles query, optionally restricted to one style
    pub(crate) fn request_styles(
        &mut self,
        id: Option<StyleId>,
        purpose: PendingFetch,
    ) {
        let mut request = GetStylesRequest::new(self.match_url());
        if let Some(id) = id {
            request = request.for_style(id);
        }
        debug!(id = ?request.id, ?purpose, "requesting styles");
        let request_id = self.runtime.send(request);
        self.pending.insert(request_id, purpose);
    }

    /// URL sent with styles queries. Frames without a real URL yet (dynamic
    /// `about:` and `javascript:` frames) borrow their parent's.
    pub fn match_url(&self) -> String {
        let url = self.document.url();
        if MATCHABLE_SCHEMES.iter().any(|s| url.starts_with(s)) {
            return url;
        }
        self.document.parent_url().unwrap_or(url)
    }

    /// Whether the engine runs inside one of the extension's own pages
    pub fn is_own_page(&self) -> bool {
        self.document.url().starts_with(OWN_PAGE_SCHEME)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_disposed(&self) -> bool {
        self.state == EngineState::Disposed
    }

    /// Current global disable flag
    pub fn disable_all(&self) -> bool {
        self.injector.disable_all()
    }

    /// Node injected styles are currently appended to
    pub fn style_root(&self) -> Option<NodeId> {
        self.injector.root()
    }

    pub fn watchdog_state(&self) -> WatchdogState {
        self.watchdog.state()
    }

    /// Number of styles queries still waiting for a reply
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// Number of scheduled timers
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}
