//! Async session driver
//!
//! Runs an engine on a tokio runtime: inbound events arrive over an unbounded
//! channel, timers are awaited with `sleep_until`, and mutation records are
//! drained after every step. The engine is not `Send` (documents are usually
//! single-threaded handles), so the future is meant to be awaited on a
//! current-thread runtime or inside a `LocalSet`.

use std::time::Instant;

use stylus_dom::HostDocument;
use stylus_protocol::{Notification, Reply, RequestId, StyleResponse};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

use crate::engine::Engine;
use crate::runtime::{Clock, Runtime};

/// An event delivered to a running session
#[derive(Debug)]
pub enum Inbound {
    /// A push notification, with a reply channel when the sender expects one
    Notification {
        notification: Notification,
        reply: Option<oneshot::Sender<Reply>>,
    },
    /// The reply to a styles query the engine sent
    Styles {
        request: RequestId,
        response: Option<StyleResponse>,
    },
    /// A page-level custom signal
    PageSignal(String),
    /// The document's child list changed
    DocumentMutated,
}

impl Inbound {
    /// A notification that expects no reply
    pub fn notify(notification: Notification) -> Self {
        Inbound::Notification {
            notification,
            reply: None,
        }
    }
}

/// Clock following tokio's time source, so paused test time applies to
/// engine timers too
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

/// Drive `engine` until the inbound channel closes or the engine shuts down.
/// Returns the engine so the caller can inspect its final state.
pub async fn run<D, R>(
    mut engine: Engine<D, R>,
    mut inbound: mpsc::UnboundedReceiver<Inbound>,
) -> Engine<D, R>
where
    D: HostDocument,
    R: Runtime,
{
    engine.start();
    loop {
        engine.process_mutations();
        if engine.is_disposed() {
            debug!("engine disposed, session ends");
            break;
        }

        let deadline = engine.next_deadline();
        tokio::select! {
            event = inbound.recv() => match event {
                Some(event) => deliver(&mut engine, event),
                None => {
                    debug!("inbound channel closed, session ends");
                    break;
                }
            },
            _ = wait_until(deadline) => engine.tick(),
        }
    }
    engine
}

fn deliver<D: HostDocument, R: Runtime>(engine: &mut Engine<D, R>, event: Inbound) {
    match event {
        Inbound::Notification {
            notification,
            reply,
        } => {
            let answer = engine.handle_message(notification);
            if let (Some(answer), Some(reply)) = (answer, reply) {
                // The sender may have stopped waiting
                let _ = reply.send(answer);
            }
        }
        Inbound::Styles { request, response } => engine.handle_styles(request, response),
        Inbound::PageSignal(name) => engine.handle_page_signal(&name),
        Inbound::DocumentMutated => trace!("document mutated"),
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
