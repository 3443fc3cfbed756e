//! Element Registry
//!
//! In-memory bookkeeping of which element belongs to which style:
//!
//! - **active**: elements currently injected into the document
//! - **inactive**: elements set aside because their style was disabled
//! - **retiring**: styles whose previous element was renamed to a ghost and
//!   is waiting for its replacement, with the forced-removal timer
//!
//! A style id is in at most one of active/inactive at any time. The registry
//! never touches the document; the engine does that through the injector.

use std::collections::HashMap;

use stylus_dom::NodeId;
use stylus_protocol::StyleId;

use crate::timers::TimerId;

/// Style id to element maps
#[derive(Debug, Default)]
pub struct Registry {
    active: HashMap<StyleId, NodeId>,
    inactive: HashMap<StyleId, NodeId>,
    retiring: HashMap<StyleId, TimerId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `element` as the injected element of `id`, dropping any cached
    /// inactive entry. Returns the element previously registered as active.
    pub fn register_active(&mut self, id: StyleId, element: NodeId) -> Option<NodeId> {
        self.inactive.remove(&id);
        self.active.insert(id, element)
    }

    /// Set `element` (the node currently attached for `id`) aside as inactive
    pub fn move_to_inactive(&mut self, id: StyleId, element: NodeId) {
        self.active.remove(&id);
        self.inactive.insert(id, element);
    }

    /// Bring a set-aside element back as active.
    ///
    /// Falls back to the active entry when nothing was set aside, so a
    /// registered but detached element can be attached again.
    pub fn reactivate(&mut self, id: &StyleId) -> Option<NodeId> {
        match self.inactive.remove(id) {
            Some(element) => {
                self.active.insert(id.clone(), element);
                Some(element)
            }
            None => self.active.get(id).copied(),
        }
    }

    /// Forget active and inactive entries, keeping any retirement
    pub fn forget(&mut self, id: &StyleId) {
        self.active.remove(id);
        self.inactive.remove(id);
    }

    /// Forget everything about `id`. Returns the retirement timer the caller
    /// has to cancel, if one was pending.
    pub fn delete_all(&mut self, id: &StyleId) -> Option<TimerId> {
        self.forget(id);
        self.retiring.remove(id)
    }

    /// Whether any entry exists for `id`
    pub fn has_any(&self, id: &StyleId) -> bool {
        self.active.contains_key(id) || self.inactive.contains_key(id) || self.retiring.contains_key(id)
    }

    /// Mark `id` as retiring under `timer`. The live entries are dropped since
    /// the element now carries a ghost id. Returns a previous timer for the
    /// same id, which the caller has to cancel.
    pub fn retire(&mut self, id: StyleId, timer: TimerId) -> Option<TimerId> {
        self.forget(&id);
        self.retiring.insert(id, timer)
    }

    /// Stop tracking the retirement of `id`
    pub fn take_retirement(&mut self, id: &StyleId) -> Option<TimerId> {
        self.retiring.remove(id)
    }

    pub fn is_retiring(&self, id: &StyleId) -> bool {
        self.retiring.contains_key(id)
    }

    pub fn active(&self, id: &StyleId) -> Option<NodeId> {
        self.active.get(id).copied()
    }

    pub fn inactive(&self, id: &StyleId) -> Option<NodeId> {
        self.inactive.get(id).copied()
    }

    /// Active entries in id order
    pub fn active_entries(&self) -> Vec<(StyleId, NodeId)> {
        let mut entries: Vec<_> = self
            .active
            .iter()
            .map(|(id, el)| (id.clone(), *el))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Retiring ids in id order
    pub fn retiring_ids(&self) -> Vec<StyleId> {
        let mut ids: Vec<_> = self.retiring.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn inactive_len(&self) -> usize {
        self.inactive.len()
    }

    pub fn retiring_len(&self) -> usize {
        self.retiring.len()
    }

    /// Drop every entry, returning the retirement timers to cancel
    pub fn clear(&mut self) -> Vec<TimerId> {
        self.active.clear();
        self.inactive.clear();
        self.retiring.drain().map(|(_, timer)| timer).collect()
    }

    /// Whether no id is both active and inactive
    pub fn is_exclusive(&self) -> bool {
        self.active.keys().all(|id| !self.inactive.contains_key(id))
    }
}
