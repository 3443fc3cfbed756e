//! Root-Rewrite Watchdog
//!
//! Notices the document root being replaced after styles were injected and
//! re-attaches copies of every active element under the new root. Two
//! sources trigger it: child-list mutation records of the document (a script
//! inside the page rewrote it) and a deferred comparison of the live root
//! against the stored one (the embedder rewrote it before the observer was
//! in place). Hosts without a mutation observer, or configs asking for it,
//! get a periodic comparison instead.

use stylus_dom::HostDocument;
use tracing::{debug, info, trace, warn};

use crate::Result;
use crate::config::WatchdogMode;
use crate::engine::Engine;
use crate::injector::expected_root;
use crate::runtime::Runtime;
use crate::timers::{TimerId, TimerTask};

/// Lifecycle of the watchdog. It is installed at most once per engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchdogState {
    /// Not installed yet
    #[default]
    Idle,
    /// Receiving child-list mutation records
    Observing,
    /// Comparing the root on an interval
    Polling,
    /// Torn down for good
    Disconnected,
}

#[derive(Debug, Default)]
pub(crate) struct Watchdog {
    state: WatchdogState,
    poll_timer: Option<TimerId>,
    check_timer: Option<TimerId>,
}

impl Watchdog {
    pub(crate) fn state(&self) -> WatchdogState {
        self.state
    }
}

impl<D: HostDocument, R: Runtime> Engine<D, R> {
    /// Install the watchdog once something has been injected. Never on the
    /// extension's own pages and never twice.
    pub(crate) fn install_watchdog(&mut self) {
        if self.is_own_page()
            || self.watchdog.state != WatchdogState::Idle
            || self.registry.active_len() == 0
        {
            return;
        }

        let polling = self.config.watchdog.mode == WatchdogMode::Polling
            || !self.document.supports_mutation_observer();
        let now = self.now();
        if polling {
            let deadline = now + self.config.poll_interval();
            self.watchdog.poll_timer = Some(self.timers.schedule(deadline, TimerTask::PollRoot));
            self.watchdog.state = WatchdogState::Polling;
        } else {
            self.document.observe_child_list();
            self.watchdog.state = WatchdogState::Observing;
        }
        self.watchdog.check_timer = Some(self.timers.schedule(now, TimerTask::RootCheck));
        debug!(state = ?self.watchdog.state, "watchdog installed");
    }

    /// Drain the document's child-list records and re-inject when one of
    /// them added a new root element
    pub fn process_mutations(&mut self) {
        if self.ensure_running().is_err() || self.watchdog.state != WatchdogState::Observing {
            return;
        }
        let records = self.document.take_mutation_records();
        let root = self.document.document_element();
        let rewritten = records.iter().flat_map(|r| r.added.iter()).any(|node| {
            Some(*node) == root || self.document.local_name(*node).as_deref() == Some("html")
        });
        if rewritten && let Err(e) = self.reinject() {
            warn!(error = %e, "failed to re-inject styles");
        }
    }

    /// One-shot comparison scheduled when the watchdog is installed
    pub(crate) fn check_root(&mut self) -> Result<()> {
        self.watchdog.check_timer = None;
        self.reinject_if_root_changed()
    }

    /// Periodic comparison in polling mode
    pub(crate) fn poll_root(&mut self) -> Result<()> {
        self.watchdog.poll_timer = None;
        if self.watchdog.state != WatchdogState::Polling {
            return Ok(());
        }
        let deadline = self.now() + self.config.poll_interval();
        self.watchdog.poll_timer = Some(self.timers.schedule(deadline, TimerTask::PollRoot));
        self.reinject_if_root_changed()
    }

    fn reinject_if_root_changed(&mut self) -> Result<()> {
        let live = expected_root(&self.document);
        if live.is_some() && live != self.injector.root() {
            self.reinject()?;
        } else {
            trace!("document root unchanged");
        }
        Ok(())
    }

    /// Point the injector at the current root and attach a copy of every
    /// active element there
    pub(crate) fn reinject(&mut self) -> Result<()> {
        let root = expected_root(&self.document);
        self.injector.set_root(root);
        let entries = self.registry.active_entries();
        info!(count = entries.len(), "document root replaced, re-injecting styles");

        for (id, element) in entries {
            let copy = self.document.import_node(element, true)?;
            if self.injector.attach(&mut self.document, copy)? {
                self.registry.register_active(id, copy);
            }
        }
        Ok(())
    }

    /// Stop observing and cancel the watchdog's timers
    pub(crate) fn disconnect_watchdog(&mut self) {
        if self.watchdog.state == WatchdogState::Observing {
            self.document.disconnect_observer();
        }
        for timer in [self.watchdog.poll_timer.take(), self.watchdog.check_timer.take()]
            .into_iter()
            .flatten()
        {
            self.timers.cancel(timer);
        }
        self.watchdog.state = WatchdogState::Disconnected;
    }
}
