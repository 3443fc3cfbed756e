//! End-to-end integration test for the vertical slice
//!
//! This test exercises the complete flow: TOML config -> engine -> wire
//! messages in JSON -> document markup.

use pretty_assertions::assert_eq;
use serde_json::json;
use stylus_core::EngineConfig;
use stylus_dom::MemoryDocument;
use stylus_protocol::{Notification, Reply, StyleResponse};
use stylus_test_utils::Harness;

const PAGE: &str = "https://example.test/article";

const CONFIG: &str = r#"
retire_delay_ms = 250

[watchdog]
mode = "observer"
"#;

fn wire(h: &mut Harness, text: &str) -> Option<Reply> {
    let notification = Notification::from_json(text).unwrap();
    h.notify(notification)
}

fn answer(h: &mut Harness, value: serde_json::Value) {
    let response = StyleResponse::from_value(value).unwrap();
    h.respond(Some(response));
}

fn harness() -> Harness {
    let config = EngineConfig::parse(CONFIG).unwrap();
    Harness::with_config(config, MemoryDocument::html(PAGE))
}

#[test]
fn test_initial_request_wire_shape() {
    let h = harness();
    let request = serde_json::to_value(&h.runtime.sent()[0]).unwrap();
    assert_eq!(
        request,
        json!({
            "method": "getStyles",
            "matchUrl": PAGE,
            "enabled": true,
            "asHash": true
        })
    );
}

#[test]
fn test_vertical_slice() {
    let mut h = harness();

    // Initial snapshot
    answer(
        &mut h,
        json!({
            "1": [{"code": "a{color:red}"}],
            "2": [{"code": "b{}"}],
            "disableAll": false
        }),
    );
    h.advance(0);
    insta::assert_snapshot!(h.doc.to_markup(), @r###"<html><head></head><body></body><style id="stylus-1" class="stylus" type="text/css">a{color:red}</style><style id="stylus-2" class="stylus" type="text/css">b{}</style></html>"###);

    // Code change for style 2 shipped inline
    wire(
        &mut h,
        r#"{"method":"styleUpdated","codeIsUpdated":true,
            "style":{"id":2,"enabled":true,"sections":[{"code":"b{color:blue}"}]}}"#,
    );
    h.advance(0);
    assert_eq!(h.text(2).as_deref(), Some("b{color:blue}"));

    // Style 1 toggled off and on again without a fetch
    wire(
        &mut h,
        r#"{"method":"styleUpdated","codeIsUpdated":false,"style":{"id":1,"enabled":false}}"#,
    );
    assert_eq!(h.injected_ids(), vec!["stylus-2"]);
    wire(
        &mut h,
        r#"{"method":"styleUpdated","codeIsUpdated":false,"style":{"id":1,"enabled":true}}"#,
    );
    assert_eq!(h.runtime.sent_count(), 1);

    // Global disable
    wire(&mut h, r#"{"method":"prefChanged","prefs":{"disableAll":true}}"#);
    insta::assert_snapshot!(h.doc.to_markup(), @r###"<html><head></head><body></body><style id="stylus-2" class="stylus" type="text/css" disabled>b{color:blue}</style><style id="stylus-1" class="stylus" type="text/css" disabled>a{color:red}</style></html>"###);

    // Liveness probe and unknown traffic
    let reply = wire(&mut h, r#"{"method":"ping"}"#).unwrap();
    assert_eq!(serde_json::to_value(reply).unwrap(), json!(true));
    assert_eq!(wire(&mut h, r#"{"method":"openEditor","id":1}"#), None);

    // Deletion
    wire(&mut h, r#"{"method":"styleDeleted","id":"1"}"#);
    assert_eq!(h.injected_ids(), vec!["stylus-2"]);
}

#[test]
fn test_configured_retire_delay() {
    let mut h = harness();
    answer(&mut h, json!({"1": [{"code": "a{}"}]}));

    wire(
        &mut h,
        r#"{"method":"styleUpdated","style":{"id":1,"enabled":true}}"#,
    );
    h.advance(249);
    assert_eq!(h.injected_ids(), vec!["stylus-ghost-1"]);

    h.advance(1);
    assert!(h.injected_ids().is_empty());
}
