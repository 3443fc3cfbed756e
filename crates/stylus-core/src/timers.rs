//! Deterministic timer queue
//!
//! The engine never sleeps. Timers are entries in this queue; the host asks
//! for the next deadline and calls back into the engine once it has passed.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use stylus_protocol::StyleId;

/// Handle of a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Work attached to a timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerTask {
    /// Forced removal of a retired element whose replacement never arrived
    RetireGhost(StyleId),
    /// Removal of retired elements whose replacements are attached
    GhostSweep,
    /// One-shot comparison of the live root against the stored one
    RootCheck,
    /// Repeating root comparison (polling watchdog)
    PollRoot,
}

/// Timers ordered by deadline, ties broken by scheduling order
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    queue: BTreeMap<(Instant, TimerId), TimerTask>,
    deadlines: HashMap<TimerId, Instant>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to run at `deadline`
    pub fn schedule(&mut self, deadline: Instant, task: TimerTask) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.queue.insert((deadline, id), task);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Cancel a pending timer, returning its task if it had not fired yet
    pub fn cancel(&mut self, id: TimerId) -> Option<TimerTask> {
        let deadline = self.deadlines.remove(&id)?;
        self.queue.remove(&(deadline, id))
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Remove and return the earliest timer due at `now`
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerId, TimerTask)> {
        let (deadline, id) = *self.queue.keys().next()?;
        if deadline > now {
            return None;
        }
        self.deadlines.remove(&id);
        let task = self.queue.remove(&(deadline, id))?;
        Some((id, task))
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.queue.clear();
        self.deadlines.clear();
    }
}
