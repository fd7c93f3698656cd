#![forbid(unsafe_code)]

//! Integration tests: open/close lifecycle against a full page fixture.

use popup_core::{Event, EventTarget, EventType, Key};
use popup_harness::{PageFixture, init_test_logging};
use popup_widgets::{
    AlwaysDecline, BackdropOptions, ConfigError, ConfigWarning, Popup, PopupOptions, PopupPhase,
    Target,
};
use pretty_assertions::assert_eq;

fn escape_listeners(page: &PageFixture) -> usize {
    page.doc
        .listener_count(EventTarget::Document, EventType::KeyDown)
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn valid_targets_construct_cleanly() {
    init_test_logging();
    let page = PageFixture::new();
    let dialog = page.add_dialog("callback-modal", 1);

    for target in [
        Target::from("#callback-modal"),
        Target::from("div.popup"),
        Target::from("body > div[id=callback-modal]"),
        Target::from(dialog.root),
    ] {
        let popup = Popup::new(&page.doc, target.clone(), PopupOptions::new());
        assert!(!popup.has_error().has_error, "{target}");
        assert_eq!(popup.config().map(|c| c.target), Some(dialog.root));
        popup.detach();
    }
}

#[test]
fn unresolvable_target_is_inert_forever() {
    init_test_logging();
    let page = PageFixture::new();
    let dialog = page.add_dialog("callback-modal", 1);
    let before = page.snapshot();

    let popup = Popup::new(&page.doc, ".does-not-exist", PopupOptions::new());
    let report = popup.has_error();
    assert!(report.has_error);
    assert_eq!(report.errors, vec!["no target element"]);
    assert!(popup.close_buttons().is_empty());

    popup.open(None);
    popup.close(None, false);
    popup.open(None);
    assert!(!popup.is_open());
    assert_eq!(popup.phase(), PopupPhase::Errored);
    assert_eq!(page.snapshot(), before);
    assert_eq!(page.doc.total_listeners(), 0);

    page.doc.dispatch(&Event::click(dialog.close_buttons[0]));
    assert_eq!(page.snapshot(), before);
}

#[test]
fn text_node_target_is_invalid_type() {
    let page = PageFixture::new();
    let text = page.doc.create_text("hello");
    let popup = Popup::new(&page.doc, text, PopupOptions::new());
    assert_eq!(popup.errors(), &[ConfigError::InvalidSelectorType]);
    assert_eq!(popup.has_error().errors, vec!["invalid selector type"]);
}

#[test]
fn null_target_and_malformed_selector_are_errors() {
    let page = PageFixture::new();
    let popup = Popup::new(&page.doc, Target::Null, PopupOptions::new());
    assert_eq!(popup.errors(), &[ConfigError::NoTargetElement]);

    let popup = Popup::new(&page.doc, "div::after", PopupOptions::new());
    assert!(matches!(
        popup.errors(),
        [ConfigError::InvalidSelector { selector, .. }] if selector == "div::after"
    ));
}

#[test]
fn unresolved_custom_backdrop_falls_back_with_warning() {
    let page = PageFixture::new();
    let dialog = page.add_dialog("callback-modal", 0);
    let options = PopupOptions::new().backdrop(BackdropOptions::new().element(".page-darkener"));
    let popup = Popup::new(&page.doc, dialog.root, options);
    assert!(!popup.has_error().has_error);
    assert!(matches!(
        popup.warnings(),
        [ConfigWarning::BackdropUnresolved { .. }]
    ));
    popup.open(None);
    assert!(page.backdrop_has("showed"));
}

#[test]
fn page_without_backdrop_still_works() {
    let page = PageFixture::without_backdrop();
    let dialog = page.add_dialog("callback-modal", 1);
    let popup = Popup::new(&page.doc, dialog.root, PopupOptions::new());
    assert_eq!(popup.warnings(), &[ConfigWarning::BackdropMissing]);
    popup.open(None);
    assert!(page.scroll_locked("not-scrollable"));
    popup.close(None, false);
    assert!(!popup.is_open());
}

// ============================================================================
// Transitions
// ============================================================================

#[test]
fn round_trip_restores_page_classes() {
    init_test_logging();
    let page = PageFixture::new();
    let dialog = page.add_dialog("callback-modal", 2);
    let popup = Popup::new(&page.doc, "#callback-modal", PopupOptions::new());
    let before = page.snapshot();

    popup.open(None);
    let opened = page.snapshot();
    let mut expected = vec![page.root(), page.body(), dialog.root];
    expected.extend(page.backdrop);
    expected.sort_unstable();
    assert_eq!(before.changed(&opened), expected);

    popup.close(None, false);
    assert_eq!(page.snapshot(), before);
}

#[test]
fn custom_classes_are_used() {
    let page = PageFixture::new();
    let dialog = page.add_dialog("callback-modal", 0);
    let options = PopupOptions::new()
        .active_class("opened")
        .body_lock_class("y-hidden")
        .backdrop(BackdropOptions::new().active_class("visible"));
    let popup = Popup::new(&page.doc, dialog.root, options);
    popup.open(None);
    assert!(page.doc.has_class(dialog.root, "opened"));
    assert!(!page.doc.has_class(dialog.root, "showed"));
    assert!(page.scroll_locked("y-hidden"));
    assert!(page.backdrop_has("visible"));
    popup.close(None, false);
    assert!(!page.backdrop_has("visible"));
}

#[test]
fn skip_backdrop_close_leaves_backdrop_on() {
    let page = PageFixture::new();
    let dialog = page.add_dialog("callback-modal", 0);
    let popup = Popup::new(&page.doc, dialog.root, PopupOptions::new());
    popup.open(None);
    popup.close(None, true);
    assert!(!page.doc.has_class(dialog.root, "showed"));
    assert!(!page.scroll_locked("not-scrollable"));
    assert!(page.backdrop_has("showed"));
}

#[test]
fn overlay_click_on_dialog_closes_but_not_on_content() {
    let page = PageFixture::new();
    let dialog = page.add_dialog("callback-modal", 1);
    let popup = Popup::new(&page.doc, dialog.root, PopupOptions::new());
    popup.open(None);

    page.doc.dispatch(&Event::click(dialog.content));
    assert!(popup.is_open());
    page.doc.dispatch(&Event::click(dialog.root));
    assert!(!popup.is_open());
}

#[test]
fn escape_closes_only_while_open() {
    let page = PageFixture::new();
    let dialog = page.add_dialog("callback-modal", 0);
    let popup = Popup::new(&page.doc, dialog.root, PopupOptions::new());

    let before = page.snapshot();
    page.doc.dispatch(&Event::key(Key::Escape));
    assert_eq!(page.snapshot(), before);

    popup.open(None);
    for key in [Key::Enter, Key::Tab, Key::Char('q'), Key::parse("escape")] {
        page.doc.dispatch(&Event::key(key));
        assert!(popup.is_open());
    }
    page.doc.dispatch(&Event::key(Key::parse("Escape")));
    assert!(!popup.is_open());
    assert_eq!(page.snapshot(), before);
}

#[test]
fn disabled_escape_and_overlay_attach_nothing() {
    let page = PageFixture::new();
    let dialog = page.add_dialog("callback-modal", 0);
    let options = PopupOptions::new()
        .close_on_escape(false)
        .close_on_overlay_click(false);
    let popup = Popup::new(&page.doc, dialog.root, options);
    popup.open(None);
    assert_eq!(page.doc.total_listeners(), 0);
    page.doc.dispatch(&Event::key(Key::Escape));
    page.doc.dispatch(&Event::click(dialog.root));
    assert!(popup.is_open());
}

#[test]
fn every_close_trigger_closes() {
    let page = PageFixture::new();
    let dialog = page.add_dialog("callback-modal", 3);
    let popup = Popup::new(&page.doc, dialog.root, PopupOptions::new());
    assert_eq!(popup.close_buttons(), dialog.close_buttons.as_slice());
    for &button in &dialog.close_buttons {
        popup.open(None);
        page.doc.dispatch(&Event::click(button));
        assert!(!popup.is_open());
    }
}

#[test]
fn custom_close_trigger_selector() {
    let page = PageFixture::new();
    let dialog = page.add_dialog("callback-modal", 1);
    let link = page.doc.create_element("a");
    page.doc.add_class(link, "js-close");
    page.doc.append_child(dialog.content, link).unwrap();

    let options = PopupOptions::new().close_trigger_selector(".js-close");
    let popup = Popup::new(&page.doc, dialog.root, options);
    assert_eq!(popup.close_buttons(), &[link]);
    popup.open(None);
    page.doc.dispatch(&Event::click(dialog.close_buttons[0]));
    assert!(popup.is_open());
    page.doc.dispatch(&Event::click(link));
    assert!(!popup.is_open());
}

#[test]
fn double_open_single_close_leaves_no_listeners() {
    let page = PageFixture::new();
    let dialog = page.add_dialog("callback-modal", 1);
    let popup = Popup::new(&page.doc, dialog.root, PopupOptions::new());

    popup.open(None);
    popup.open(None);
    assert_eq!(escape_listeners(&page), 1);
    // Overlay handler plus nothing else on the dialog element itself.
    assert_eq!(page.doc.listener_count(dialog.root, EventType::Click), 1);

    popup.close(None, false);
    assert!(!popup.is_open());
    assert_eq!(escape_listeners(&page), 0);
    assert_eq!(page.doc.listener_count(dialog.root, EventType::Click), 0);
    // Close triggers stay wired.
    assert_eq!(
        page.doc
            .listener_count(dialog.close_buttons[0], EventType::Click),
        1
    );
}

#[test]
fn escape_fires_once_after_double_open() {
    let page = PageFixture::new();
    let dialog = page.add_dialog("callback-modal", 0);
    let prompts = popup_widgets::ScriptedConfirm::new(popup_widgets::Confirmation::Decline);
    let options = PopupOptions::new().require_close_confirmation(true);
    let popup = Popup::with_confirm(&page.doc, dialog.root, options, prompts.clone());
    popup.open(None);
    popup.open(None);
    page.doc.dispatch(&Event::key(Key::Escape));
    assert_eq!(prompts.prompt_count(), 1);
}

#[test]
fn repeated_close_is_harmless() {
    let page = PageFixture::new();
    let dialog = page.add_dialog("callback-modal", 0);
    let popup = Popup::new(&page.doc, dialog.root, PopupOptions::new());
    let before = page.snapshot();
    popup.close(None, false);
    popup.open(None);
    popup.close(None, false);
    popup.close(None, false);
    assert_eq!(page.snapshot(), before);
    assert_eq!(page.doc.total_listeners(), 0);
}

#[test]
fn declined_confirmation_via_trigger_changes_nothing() {
    let page = PageFixture::new();
    let dialog = page.add_dialog("callback-modal", 1);
    let options = PopupOptions::new().require_close_confirmation(true);
    let popup = Popup::with_confirm(&page.doc, dialog.root, options, AlwaysDecline);
    popup.open(None);
    let opened = page.snapshot();
    let listeners = page.doc.total_listeners();

    page.doc.dispatch(&Event::click(dialog.close_buttons[0]));
    page.doc.dispatch(&Event::key(Key::Escape));
    page.doc.dispatch(&Event::click(dialog.root));
    assert!(popup.is_open());
    assert_eq!(page.snapshot(), opened);
    assert_eq!(page.doc.total_listeners(), listeners);
}

#[test]
fn detach_leaves_no_listeners_behind() {
    let page = PageFixture::new();
    let dialog = page.add_dialog("callback-modal", 2);
    let before = page.snapshot();
    let popup = Popup::new(&page.doc, dialog.root, PopupOptions::new());
    popup.open(None);
    popup.detach();
    assert_eq!(page.doc.total_listeners(), 0);
    assert_eq!(page.snapshot(), before);
}

#[test]
fn cloned_handles_share_state() {
    let page = PageFixture::new();
    let dialog = page.add_dialog("callback-modal", 0);
    let popup = Popup::new(&page.doc, dialog.root, PopupOptions::new());
    let handle = popup.clone();
    handle.open(None);
    assert!(popup.is_open());
    popup.close(None, false);
    assert!(!handle.is_open());
}
