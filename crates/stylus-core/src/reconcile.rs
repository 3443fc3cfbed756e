//! Reconciliation of inbound change events against the registry
//!
//! Per style id the engine is in one of four states: absent, active,
//! inactive (detached and cached), or retiring (renamed to a ghost and still
//! attached until its replacement shows up).

use stylus_dom::{HostDocument, NodeId};
use stylus_protocol::{Section, StyleId, StyleMap, StyleResponse, StyleState};
use tracing::{debug, info, trace};

use crate::Result;
use crate::engine::{Engine, PendingFetch};
use crate::runtime::Runtime;
use crate::timers::TimerTask;

/// Page URL of an embedded `srcdoc` frame
const SRCDOC_URL: &str = "about:srcdoc";

/// Suffix appended to every element id during a replace-all swap
const RELIC_SUFFIX: &str = "-ghost";

impl<D: HostDocument, R: Runtime> Engine<D, R> {
    /// The element currently attached for `id`, looked up by its element id
    fn attached(&self, id: &StyleId) -> Option<NodeId> {
        self.document.get_element_by_id(&self.config.element_id(id))
    }

    /// Inject a freshly fetched style. Ignored when an element for `id` is
    /// already in the document.
    pub(crate) fn add(&mut self, id: StyleId, sections: &[Section]) -> Result<()> {
        if self.attached(&id).is_some() {
            trace!(%id, "style already injected");
            return Ok(());
        }
        let element = self
            .injector
            .create_element_for(&mut self.document, &id, sections)?;
        let attached = self.injector.attach(&mut self.document, element)?;
        debug!(%id, %element, attached, "style added");
        self.registry.register_active(id, element);
        Ok(())
    }

    /// Remove every trace of `id`, including a ghost still waiting for its
    /// replacement
    pub(crate) fn delete(&mut self, id: &StyleId) -> Result<()> {
        if let Some(element) = self.attached(id) {
            self.document.remove(element)?;
        }
        self.stale_ghosts.remove(id);
        if let Some(timer) = self.registry.delete_all(id) {
            self.timers.cancel(timer);
            self.remove_ghost_element(id)?;
        }
        debug!(%id, "style deleted");
        Ok(())
    }

    /// Rename the attached element of `id` to its ghost id and keep it on
    /// screen until the replacement arrives or the retire delay passes
    pub(crate) fn retire(&mut self, id: &StyleId) -> Result<()> {
        self.stale_ghosts.remove(id);
        let Some(element) = self.attached(id) else {
            self.registry.forget(id);
            return Ok(());
        };
        if let Some(previous) = self.registry.take_retirement(id) {
            self.timers.cancel(previous);
            self.remove_ghost_element(id)?;
        }
        self.document
            .set_element_id(element, &self.config.ghost_id(id))?;
        let deadline = self.now() + self.config.retire_delay();
        let timer = self
            .timers
            .schedule(deadline, TimerTask::RetireGhost(id.clone()));
        self.registry.retire(id.clone(), timer);
        debug!(%id, %element, "style retired");
        Ok(())
    }

    /// Forced cleanup of a ghost whose replacement never arrived
    pub(crate) fn remove_ghost(&mut self, id: &StyleId) -> Result<()> {
        self.stale_ghosts.remove(id);
        if self.registry.take_retirement(id).is_some() {
            debug!(%id, "retire delay passed, removing ghost");
            self.remove_ghost_element(id)?;
        }
        Ok(())
    }

    pub(crate) fn remove_ghost_element(&mut self, id: &StyleId) -> Result<()> {
        if let Some(ghost) = self.document.get_element_by_id(&self.config.ghost_id(id)) {
            self.document.remove(ghost)?;
        }
        Ok(())
    }

    /// Remove the ghosts whose replacement is attached or that the controller
    /// answered without a replacement. The others keep waiting for their own
    /// timer.
    pub(crate) fn sweep_ghosts(&mut self) -> Result<()> {
        for id in self.registry.retiring_ids() {
            let stale = self.stale_ghosts.remove(&id);
            if !stale && self.attached(&id).is_none() {
                continue;
            }
            if let Some(timer) = self.registry.take_retirement(&id) {
                self.timers.cancel(timer);
            }
            self.remove_ghost_element(&id)?;
            trace!(%id, stale, "ghost swept");
        }
        Ok(())
    }

    fn schedule_ghost_sweep(&mut self) {
        if self.registry.retiring_len() == 0 || self.ghost_sweep.is_some() {
            return;
        }
        let now = self.now();
        self.ghost_sweep = Some(self.timers.schedule(now, TimerTask::GhostSweep));
    }

    /// `styleUpdated`
    pub(crate) fn update(&mut self, style: StyleState, code_is_updated: Option<bool>) -> Result<()> {
        if code_is_updated == Some(false) {
            return self.apply_state(&style.id, style.enabled);
        }
        if !style.enabled {
            return self.delete(&style.id);
        }
        self.retire(&style.id)?;
        self.fetch_or_apply(style)
    }

    /// `styleAdded`
    pub(crate) fn style_added(&mut self, style: StyleState) -> Result<()> {
        if !style.enabled {
            trace!(id = %style.id, "disabled style added, nothing to do");
            return Ok(());
        }
        self.fetch_or_apply(style)
    }

    /// Apply inline sections when the notification carries them, otherwise
    /// ask the controller for the style
    fn fetch_or_apply(&mut self, style: StyleState) -> Result<()> {
        match style.sections {
            Some(sections) => {
                let styles = StyleMap::from([(style.id, sections)]);
                self.apply_styles(Some(StyleResponse::new(styles)))
            }
            None => {
                let id = style.id;
                self.request_styles(Some(id.clone()), PendingFetch::Apply(Some(id)));
                Ok(())
            }
        }
    }

    /// Move `id` towards `enabled` without touching its code
    pub(crate) fn apply_state(&mut self, id: &StyleId, enabled: bool) -> Result<()> {
        let in_doc = self.attached(id);
        let cached = self
            .registry
            .inactive(id)
            .or_else(|| self.registry.active(id));

        match (enabled, in_doc, cached) {
            (true, Some(_), _) | (false, None, _) => Ok(()),
            (true, None, None) => {
                self.request_styles(Some(id.clone()), PendingFetch::Apply(Some(id.clone())));
                Ok(())
            }
            (true, None, Some(_)) => self.enable(id),
            (false, Some(element), _) => self.disable(id, element),
        }
    }

    /// Attach the cached element of `id` again, or fetch it when nothing is
    /// cached
    pub(crate) fn enable(&mut self, id: &StyleId) -> Result<()> {
        match self.registry.reactivate(id) {
            Some(element) => {
                self.injector.attach(&mut self.document, element)?;
                debug!(%id, %element, "style enabled from cache");
            }
            None => self.request_styles(Some(id.clone()), PendingFetch::Apply(Some(id.clone()))),
        }
        Ok(())
    }

    /// Detach `element` and cache it for a later enable
    pub(crate) fn disable(&mut self, id: &StyleId, element: NodeId) -> Result<()> {
        self.registry.move_to_inactive(id.clone(), element);
        self.document.remove(element)?;
        if self.document.url() == SRCDOC_URL
            && let Some(duplicate) = self.attached(id)
        {
            self.document.remove(duplicate)?;
        }
        debug!(%id, %element, "style disabled");
        Ok(())
    }

    /// Apply a styles response: the global flag first, then every style,
    /// then the watchdog and the ghost sweep
    pub(crate) fn apply_styles(&mut self, response: Option<StyleResponse>) -> Result<()> {
        let Some(response) = response else {
            debug!("controller not ready, requesting styles again");
            self.request_styles(None, PendingFetch::Apply(None));
            return Ok(());
        };
        if let Some(disable) = response.disable_all {
            self.set_global_disable(disable)?;
        }
        self.injector.refresh_root(&self.document);
        for (id, sections) in &response.styles {
            self.add(id.clone(), sections)?;
        }
        self.install_watchdog();
        self.schedule_ghost_sweep();
        Ok(())
    }

    /// Apply the reply to one of the engine's own styles queries. Retiring
    /// styles the query covered but the reply left out will not get a
    /// replacement, so their ghosts go with the next sweep.
    pub(crate) fn apply_reply(
        &mut self,
        requested: Option<StyleId>,
        response: Option<StyleResponse>,
    ) -> Result<()> {
        if let Some(response) = &response {
            for id in self.registry.retiring_ids() {
                let covered = requested.as_ref().is_none_or(|r| *r == id);
                if covered && !response.styles.contains_key(&id) && !self.awaiting(&id) {
                    trace!(%id, "reply has no replacement for ghost");
                    self.stale_ghosts.insert(id);
                }
            }
        }
        self.apply_styles(response)
    }

    /// Whether a styles query for `id` alone is still outstanding
    fn awaiting(&self, id: &StyleId) -> bool {
        self.pending
            .values()
            .any(|purpose| matches!(purpose, PendingFetch::Apply(Some(p)) if p == id))
    }

    /// Swap the whole style set without a frame where nothing is applied
    pub(crate) fn replace_all(&mut self, response: StyleResponse) -> Result<()> {
        let relics = self.injector.injected_elements(&self.document);
        for relic in &relics {
            if let Some(id) = self.document.element_id(*relic) {
                self.document
                    .set_element_id(*relic, &format!("{id}{RELIC_SUFFIX}"))?;
            }
        }
        for timer in self.registry.clear() {
            self.timers.cancel(timer);
        }
        self.stale_ghosts.clear();
        if let Some(sweep) = self.ghost_sweep.take() {
            self.timers.cancel(sweep);
        }
        info!(
            old = relics.len(),
            new = response.styles.len(),
            "replacing all styles"
        );

        let applied = self.apply_styles(Some(response));
        for relic in relics {
            self.document.remove(relic)?;
        }
        applied
    }

    /// Toggle the global disable flag
    pub(crate) fn set_global_disable(&mut self, disable: bool) -> Result<()> {
        if self.injector.set_global_disable(&mut self.document, disable)? {
            info!(disable, "global disable changed");
        }
        Ok(())
    }
}
