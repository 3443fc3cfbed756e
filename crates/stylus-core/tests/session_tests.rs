//! Async session driver on paused tokio time

use std::time::Duration;

use pretty_assertions::assert_eq;
use stylus_core::session::{self, Inbound};
use stylus_core::{Engine, EngineConfig, TokioClock};
use stylus_dom::{HostDocument, MemoryDocument};
use stylus_protocol::{Notification, Reply, StyleState};
use stylus_test_utils::runtime::DEFAULT_RUNTIME_ID;
use stylus_test_utils::{FakeRuntime, styles};
use tokio::sync::{mpsc, oneshot};

const URL: &str = "https://example.test/page";

fn engine(doc: &MemoryDocument, runtime: &FakeRuntime) -> Engine<MemoryDocument, FakeRuntime> {
    Engine::with_clock(EngineConfig::default(), doc.clone(), runtime.clone(), TokioClock).unwrap()
}

/// Let the driver catch up with everything sent so far
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

fn ids(doc: &MemoryDocument) -> Vec<String> {
    doc.elements_by_class("style", "stylus")
        .into_iter()
        .filter_map(|el| doc.element_id(el))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_session_applies_styles_and_answers_ping() {
    let doc = MemoryDocument::html(URL);
    let runtime = FakeRuntime::new();
    let (tx, rx) = mpsc::unbounded_channel();

    let script = {
        let doc = doc.clone();
        let runtime = runtime.clone();
        async move {
            settle().await;
            let (request, _) = runtime.pop_request().unwrap();
            tx.send(Inbound::Styles {
                request,
                response: Some(styles(&[(1, &["a{}"])])),
            })
            .unwrap();
            settle().await;
            assert_eq!(ids(&doc), vec!["stylus-1"]);

            let (reply_tx, reply_rx) = oneshot::channel();
            tx.send(Inbound::Notification {
                notification: Notification::Ping,
                reply: Some(reply_tx),
            })
            .unwrap();
            assert_eq!(reply_rx.await.unwrap(), Reply::Ack(true));
        }
    };

    let (engine, ()) = tokio::join!(session::run(engine(&doc, &runtime), rx), script);
    assert!(!engine.is_disposed());
    assert_eq!(engine.registry().active_len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_session_fires_retire_timer() {
    let doc = MemoryDocument::html(URL);
    let runtime = FakeRuntime::new();
    let (tx, rx) = mpsc::unbounded_channel();

    let script = {
        let doc = doc.clone();
        let runtime = runtime.clone();
        async move {
            settle().await;
            let (request, _) = runtime.pop_request().unwrap();
            tx.send(Inbound::Styles {
                request,
                response: Some(styles(&[(1, &["a{}"])])),
            })
            .unwrap();
            tx.send(Inbound::notify(Notification::StyleUpdated {
                style: StyleState::new(1, true),
                code_is_updated: Some(true),
            }))
            .unwrap();
            settle().await;
            assert_eq!(ids(&doc), vec!["stylus-ghost-1"]);

            tokio::time::sleep(Duration::from_millis(990)).await;
            assert_eq!(ids(&doc), vec!["stylus-ghost-1"]);

            tokio::time::sleep(Duration::from_millis(20)).await;
            assert!(ids(&doc).is_empty());
        }
    };

    let (engine, ()) = tokio::join!(session::run(engine(&doc, &runtime), rx), script);
    assert_eq!(engine.registry().retiring_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_session_reinjects_after_rewrite() {
    let doc = MemoryDocument::html(URL);
    let runtime = FakeRuntime::new();
    let (tx, rx) = mpsc::unbounded_channel();

    let script = {
        let doc = doc.clone();
        let runtime = runtime.clone();
        async move {
            settle().await;
            let (request, _) = runtime.pop_request().unwrap();
            tx.send(Inbound::Styles {
                request,
                response: Some(styles(&[(1, &["a{}"])])),
            })
            .unwrap();
            settle().await;

            doc.replace_document_element();
            tx.send(Inbound::DocumentMutated).unwrap();
            settle().await;
            assert_eq!(ids(&doc), vec!["stylus-1"]);
        }
    };

    tokio::join!(session::run(engine(&doc, &runtime), rx), script);
}

#[tokio::test(start_paused = true)]
async fn test_session_ends_when_orphaned() {
    let doc = MemoryDocument::html(URL);
    let runtime = FakeRuntime::new();
    let (tx, rx) = mpsc::unbounded_channel();

    runtime.invalidate();
    tx.send(Inbound::PageSignal(DEFAULT_RUNTIME_ID.to_string()))
        .unwrap();

    let engine = session::run(engine(&doc, &runtime), rx).await;

    assert!(engine.is_disposed());
    assert!(tx.send(Inbound::notify(Notification::Ping)).is_err());
}

#[tokio::test(start_paused = true)]
async fn test_session_ends_when_channel_closes() {
    let doc = MemoryDocument::html(URL);
    let runtime = FakeRuntime::new();
    let (tx, rx) = mpsc::unbounded_channel::<Inbound>();
    drop(tx);

    let engine = session::run(engine(&doc, &runtime), rx).await;

    assert!(!engine.is_disposed());
    assert_eq!(runtime.sent_count(), 1);
}
