//! Decoding tests for controller notifications

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use stylus_protocol::{
    Notification, Prefs, Section, StyleId, StyleResponse, StyleState, StylesPayload,
};

#[test]
fn test_style_deleted() {
    let n = Notification::from_json(r#"{"method":"styleDeleted","id":1}"#).unwrap();
    assert_eq!(n, Notification::StyleDeleted { id: StyleId::from(1) });
}

#[test]
fn test_style_updated_state_only() {
    let n = Notification::from_value(json!({
        "method": "styleUpdated",
        "style": {"id": 3, "enabled": false},
        "codeIsUpdated": false
    }))
    .unwrap();
    assert_eq!(
        n,
        Notification::StyleUpdated {
            style: StyleState::new(3, false),
            code_is_updated: Some(false),
        }
    );
}

#[test]
fn test_style_updated_without_flag_defaults_to_none() {
    let n = Notification::from_value(json!({
        "method": "styleUpdated",
        "style": {"id": 3, "enabled": true, "sections": [{"code": "a{}"}]}
    }))
    .unwrap();
    let Notification::StyleUpdated { style, code_is_updated } = n else {
        panic!("Expected StyleUpdated");
    };
    assert_eq!(code_is_updated, None);
    assert_eq!(style.sections, Some(vec![Section::new("a{}")]));
}

#[test]
fn test_style_added() {
    let n = Notification::from_json(r#"{"method":"styleAdded","style":{"id":"9","enabled":true}}"#)
        .unwrap();
    assert_eq!(
        n,
        Notification::StyleAdded {
            style: StyleState::new("9", true)
        }
    );
}

#[test]
fn test_style_apply_inline() {
    let n = Notification::from_value(json!({
        "method": "styleApply",
        "styles": {"2": [{"code": "b{}"}], "1": [{"code": "a{}"}]}
    }))
    .unwrap();
    let Notification::StyleApply {
        styles: StylesPayload::Styles(response),
    } = n
    else {
        panic!("Expected inline styles");
    };
    let ids: Vec<&str> = response.styles.keys().map(StyleId::as_str).collect();
    assert_eq!(ids, vec!["1", "2"]);
}

#[rstest]
#[case::apply("styleApply")]
#[case::replace_all("styleReplaceAll")]
fn test_diy_payload(#[case] method: &str) {
    let n = Notification::from_value(json!({"method": method, "styles": "DIY"})).unwrap();
    match n {
        Notification::StyleApply { styles } | Notification::StyleReplaceAll { styles } => {
            assert_eq!(styles, StylesPayload::Diy)
        }
        other => panic!("Unexpected notification {:?}", other),
    }
}

#[rstest]
#[case::apply("styleApply")]
#[case::replace_all("styleReplaceAll")]
fn test_null_payload_means_not_ready(#[case] method: &str) {
    let n = Notification::from_value(json!({"method": method, "styles": null})).unwrap();
    match n {
        Notification::StyleApply { styles } | Notification::StyleReplaceAll { styles } => {
            assert_eq!(styles, StylesPayload::NotReady)
        }
        other => panic!("Unexpected notification {:?}", other),
    }
}

#[test]
fn test_replace_all_with_empty_set() {
    let n = Notification::from_value(json!({"method": "styleReplaceAll", "styles": {}})).unwrap();
    assert_eq!(
        n,
        Notification::StyleReplaceAll {
            styles: StylesPayload::Styles(StyleResponse::default())
        }
    );
}

#[rstest]
#[case::flag_on(json!({"disableAll": true}), Some(true))]
#[case::flag_off(json!({"disableAll": false}), Some(false))]
#[case::other_pref(json!({"editor.theme": "dark"}), None)]
fn test_pref_changed(#[case] prefs: serde_json::Value, #[case] expected: Option<bool>) {
    let n = Notification::from_value(json!({"method": "prefChanged", "prefs": prefs})).unwrap();
    assert_eq!(
        n,
        Notification::PrefChanged {
            prefs: Prefs {
                disable_all: expected
            }
        }
    );
}

#[test]
fn test_ping_and_unknown() {
    assert_eq!(
        Notification::from_json(r#"{"method":"ping"}"#).unwrap(),
        Notification::Ping
    );
    let unknown = Notification::from_json(r#"{"method":"exclusionsChanged"}"#).unwrap();
    assert_eq!(unknown, Notification::Unknown);
    assert_eq!(unknown.method(), "unknown");
}

#[test]
fn test_missing_method_is_an_error() {
    assert!(Notification::from_json(r#"{"id":1}"#).is_err());
}
