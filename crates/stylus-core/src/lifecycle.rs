//! Session Lifecycle Guard
//!
//! When the controller restarts, engines attached to already open pages lose
//! their channel for good. Every new engine dispatches a page-level signal
//! named after the runtime id on start; older engines on the same page listen
//! for it, probe the channel, and shut themselves down if it is gone.

use stylus_dom::HostDocument;
use tracing::{debug, info, trace, warn};

use crate::engine::{Engine, EngineState};
use crate::runtime::Runtime;
use crate::{Error, Result};

#[derive(Debug, Default)]
pub(crate) struct LifecycleGuard {
    /// Name of the signal the engine listens for, once armed
    signal: Option<String>,
}

impl<D: HostDocument, R: Runtime> Engine<D, R> {
    /// Announce this engine to older ones and start listening for newer ones
    pub(crate) fn arm_guard(&mut self) {
        if self.is_own_page() || !self.config.orphan_check || self.guard.signal.is_some() {
            return;
        }
        let name = self.runtime.id();
        self.document.dispatch_signal(&name);
        self.document.add_signal_listener(&name);
        debug!(signal = %name, "lifecycle guard armed");
        self.guard.signal = Some(name);
    }

    /// Name of the page signal the guard listens for
    pub fn guard_signal(&self) -> Option<&str> {
        self.guard.signal.as_deref()
    }

    /// Handle a page-level signal. On the guard's own signal the channel is
    /// probed and the engine shuts down if the session is gone.
    pub fn handle_page_signal(&mut self, name: &str) {
        if self.ensure_running().is_err() || self.guard.signal.as_deref() != Some(name) {
            return;
        }
        match self.check_session() {
            Ok(()) => trace!("controller session alive"),
            Err(e) => {
                info!(error = %e, "engine orphaned, shutting down");
                self.shutdown();
            }
        }
    }

    fn check_session(&mut self) -> Result<()> {
        if self.runtime.connect() {
            Ok(())
        } else {
            Err(Error::SessionInvalidated)
        }
    }

    /// Release everything the engine holds and stop accepting work.
    ///
    /// Injected elements stay in the page: the styles remain applied, they
    /// just no longer follow controller changes. Ghosts of pending updates
    /// are removed since nothing would be left to remove them later.
    pub fn shutdown(&mut self) {
        if self.state == EngineState::Disposed {
            return;
        }
        self.disconnect_watchdog();
        if let Some(signal) = self.guard.signal.take() {
            self.document.remove_signal_listener(&signal);
        }
        for id in self.registry.retiring_ids() {
            if let Err(e) = self.remove_ghost_element(&id) {
                warn!(%id, error = %e, "failed to remove ghost on shutdown");
            }
        }
        self.stale_ghosts.clear();
        for timer in self.registry.clear() {
            self.timers.cancel(timer);
        }
        self.timers.clear();
        self.pending.clear();
        self.ghost_sweep = None;
        self.state = EngineState::Disposed;
        info!("engine shut down");
    }
}
