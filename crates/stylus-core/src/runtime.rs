//! Seams to the outside world: the controller channel and the clock.

use std::time::Instant;

use stylus_protocol::{GetStylesRequest, RequestId};

/// The message channel to the privileged controller
///
/// Requests are fire-and-forget; the host delivers each reply later through
/// [`Engine::handle_styles`](crate::Engine::handle_styles) with the id this
/// method returned.
pub trait Runtime {
    /// Identifier of the extension runtime, also used as the page signal name
    fn id(&self) -> String;

    /// Send a styles query
    fn send(&mut self, request: GetStylesRequest) -> RequestId;

    /// Try to open (and immediately close) a connection to the controller.
    /// `false` means the session is gone for good.
    fn connect(&mut self) -> bool;
}

/// Source of the current time for timer deadlines
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
