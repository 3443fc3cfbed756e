//! Scenario tests
//!
//! Production scenarios driven through the public API only: a page, a
//! controller holding the canonical style set, and the engine in between.

use stylus_dom::MemoryDocument;
use stylus_protocol::{Notification, Prefs, StyleId, StyleState, StylesPayload};
use stylus_test_utils::{Harness, styles};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Page with styles 1..=n served by the controller
fn page_with(n: u64) -> Harness {
    let mut h = Harness::html();
    for id in 1..=n {
        h.controller.put(id, &[&format!("s{id}{{}}")]);
    }
    h.serve();
    h
}

fn total_elements(h: &Harness) -> usize {
    h.injected_ids().len()
}

// =============================================================================
// Scenario 1: Editing a style
// =============================================================================

mod s1_editing {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn edits_in_quick_succession_settle_on_last_version() {
        let mut h = page_with(1);

        for version in 1..=3 {
            h.controller.put(1, &[&format!("v{version}{{}}")]);
            h.notify(Notification::StyleUpdated {
                style: StyleState::new(1, true),
                code_is_updated: Some(true),
            });
            assert!(total_elements(&h) >= 1);
        }
        h.serve();
        h.advance(0);

        assert_eq!(h.injected_ids(), vec!["stylus-1"]);
        assert_eq!(h.text(1).as_deref(), Some("v3{}"));
    }

    #[test]
    fn disabling_and_deleting_an_edited_style() {
        let mut h = page_with(2);

        h.controller.set_enabled(2, false);
        h.notify(Notification::StyleUpdated {
            style: StyleState::new(2, false),
            code_is_updated: Some(false),
        });
        assert_eq!(h.injected_ids(), vec!["stylus-1"]);

        h.controller.remove(2);
        h.notify(Notification::StyleDeleted {
            id: StyleId::from(2),
        });
        assert_eq!(h.engine.registry().inactive_len(), 0);

        // Enabling a deleted style has to go back to the controller
        h.controller.put(2, &["fresh{}"]);
        h.notify(Notification::StyleUpdated {
            style: StyleState::new(2, true),
            code_is_updated: Some(false),
        });
        h.serve();
        assert_eq!(h.text(2).as_deref(), Some("fresh{}"));
    }
}

// =============================================================================
// Scenario 2: Import / restore of the whole style set
// =============================================================================

mod s2_replace_all {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn page_never_shows_zero_styles_during_swap() {
        let mut h = page_with(3);
        assert_eq!(total_elements(&h), 3);

        h.notify(Notification::StyleReplaceAll {
            styles: StylesPayload::Styles(styles(&[(7, &["x{}"]), (8, &["y{}"])])),
        });

        assert_eq!(h.injected_ids(), vec!["stylus-7", "stylus-8"]);
    }

    #[test]
    fn diy_restore_uses_controller_state() {
        let mut h = page_with(2);
        h.controller.remove(1);
        h.controller.put(9, &["z{}"]);

        h.notify(Notification::StyleReplaceAll {
            styles: StylesPayload::Diy,
        });
        h.serve();

        assert_eq!(h.injected_ids(), vec!["stylus-2", "stylus-9"]);
    }
}

// =============================================================================
// Scenario 3: Hostile and dynamic pages
// =============================================================================

mod s3_dynamic_pages {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn script_rewriting_the_document_keeps_styles() {
        let mut h = page_with(2);
        for _ in 0..3 {
            h.doc.replace_document_element();
            h.engine.process_mutations();
            assert_eq!(h.injected_ids(), vec!["stylus-1", "stylus-2"]);
        }
    }

    #[test]
    fn about_blank_frame_matches_on_parent_url() {
        let doc = MemoryDocument::html("about:blank").with_parent_url("https://example.test/host");
        let mut h = Harness::new(doc);
        assert_eq!(h.runtime.sent()[0].match_url, "https://example.test/host");

        h.controller.put(1, &["a{}"]);
        h.serve();
        assert_eq!(h.injected_ids(), vec!["stylus-1"]);
    }

    #[test]
    fn controller_not_ready_on_first_query() {
        let mut h = Harness::html();
        h.respond(None);
        h.respond(None);
        h.controller.put(1, &["a{}"]);
        h.serve();
        assert_eq!(h.runtime.sent_count(), 3);
        assert_eq!(h.injected_ids(), vec!["stylus-1"]);
    }
}

// =============================================================================
// Scenario 4: Global toggle and controller restart
// =============================================================================

mod s4_toggle_and_restart {
    use super::*;
    use pretty_assertions::assert_eq;
    use stylus_test_utils::runtime::DEFAULT_RUNTIME_ID;

    #[test]
    fn global_toggle_round_trip() {
        let mut h = page_with(2);
        for flag in [true, true, false, false] {
            h.notify(Notification::PrefChanged {
                prefs: Prefs {
                    disable_all: Some(flag),
                },
            });
            assert_eq!(h.disabled(1), Some(flag));
            assert_eq!(h.disabled(2), Some(flag));
        }
    }

    #[test]
    fn new_engine_retires_the_orphaned_one() {
        let mut old = page_with(1);
        old.runtime.invalidate();

        // A fresh engine on the same page announces itself; the page routes
        // the signal to every listener, including the old engine
        let signal = old.doc.dispatched_signals().pop().unwrap();
        assert_eq!(signal, DEFAULT_RUNTIME_ID);
        old.engine.handle_page_signal(&signal);

        assert!(old.engine.is_disposed());
        assert_eq!(old.injected_ids(), vec!["stylus-1"]);
        assert_eq!(old.doc.listener_count(DEFAULT_RUNTIME_ID), 0);
    }
}
