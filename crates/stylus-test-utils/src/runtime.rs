//! Recording runtime and a hand-driven clock.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use stylus_core::{Clock, Runtime};
use stylus_protocol::{GetStylesRequest, RequestId};

/// Runtime id used unless a test picks another one
pub const DEFAULT_RUNTIME_ID: &str = "stylus-test-extension";

#[derive(Debug)]
struct State {
    id: String,
    next_request: RequestId,
    outstanding: VecDeque<(RequestId, GetStylesRequest)>,
    sent: Vec<GetStylesRequest>,
    alive: bool,
    connects: usize,
}

/// Controller channel that records every request and never answers on its
/// own. Clones share state, so a test keeps one handle while the engine owns
/// another.
#[derive(Debug, Clone)]
pub struct FakeRuntime {
    state: Rc<RefCell<State>>,
}

impl Default for FakeRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::with_id(DEFAULT_RUNTIME_ID)
    }

    pub fn with_id(id: &str) -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                id: id.to_string(),
                next_request: 1,
                outstanding: VecDeque::new(),
                sent: Vec::new(),
                alive: true,
                connects: 0,
            })),
        }
    }

    /// Every request sent so far, oldest first
    pub fn sent(&self) -> Vec<GetStylesRequest> {
        self.state.borrow().sent.clone()
    }

    /// Number of requests sent so far
    pub fn sent_count(&self) -> usize {
        self.state.borrow().sent.len()
    }

    /// Take the oldest request nobody answered yet
    pub fn pop_request(&self) -> Option<(RequestId, GetStylesRequest)> {
        self.state.borrow_mut().outstanding.pop_front()
    }

    /// Take every unanswered request
    pub fn take_requests(&self) -> Vec<(RequestId, GetStylesRequest)> {
        self.state.borrow_mut().outstanding.drain(..).collect()
    }

    /// Number of unanswered requests
    pub fn outstanding(&self) -> usize {
        self.state.borrow().outstanding.len()
    }

    /// Make every later `connect` fail, as after a controller restart
    pub fn invalidate(&self) {
        self.state.borrow_mut().alive = false;
    }

    /// Number of `connect` probes so far
    pub fn connect_count(&self) -> usize {
        self.state.borrow().connects
    }
}

impl Runtime for FakeRuntime {
    fn id(&self) -> String {
        self.state.borrow().id.clone()
    }

    fn send(&mut self, request: GetStylesRequest) -> RequestId {
        let mut state = self.state.borrow_mut();
        let id = state.next_request;
        state.next_request += 1;
        state.sent.push(request.clone());
        state.outstanding.push_back((id, request));
        id
    }

    fn connect(&mut self) -> bool {
        let mut state = self.state.borrow_mut();
        state.connects += 1;
        state.alive
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
