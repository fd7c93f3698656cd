#![forbid(unsafe_code)]

//! Property tests: random operation sequences against a reference model.
//!
//! Runs 256 cases by default; set `PROPTEST_CASES` for longer soaks.

use popup_core::{Event, EventTarget, EventType, Key};
use popup_harness::{DialogFixture, PageFixture};
use popup_widgets::{BackdropPolicy, Popup, PopupOptions};
use proptest::prelude::*;

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Open,
    Close { skip_backdrop: bool },
    Escape,
    OtherKey,
    ClickDialog,
    ClickContent,
    ClickTrigger,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Open),
        any::<bool>().prop_map(|skip_backdrop| Op::Close { skip_backdrop }),
        Just(Op::Escape),
        Just(Op::OtherKey),
        Just(Op::ClickDialog),
        Just(Op::ClickContent),
        Just(Op::ClickTrigger),
    ]
}

/// Expected state of a single dialog on an otherwise empty page.
#[derive(Debug, Default)]
struct Model {
    open: bool,
    backdrop: bool,
}

impl Model {
    fn close(&mut self, skip_backdrop: bool) {
        self.open = false;
        if !skip_backdrop {
            self.backdrop = false;
        }
    }

    fn apply(&mut self, op: Op, escape: bool, overlay: bool) {
        match op {
            Op::Open => {
                self.open = true;
                self.backdrop = true;
            }
            Op::Close { skip_backdrop } => self.close(skip_backdrop),
            Op::Escape if self.open && escape => self.close(false),
            Op::ClickDialog if self.open && overlay => self.close(false),
            Op::ClickTrigger => self.close(false),
            Op::Escape | Op::OtherKey | Op::ClickDialog | Op::ClickContent => {}
        }
    }
}

fn run(page: &PageFixture, dialog: &DialogFixture, popup: &Popup, op: Op) {
    match op {
        Op::Open => popup.open(None),
        Op::Close { skip_backdrop } => popup.close(None, skip_backdrop),
        Op::Escape => {
            page.doc.dispatch(&Event::key(Key::Escape));
        }
        Op::OtherKey => {
            page.doc.dispatch(&Event::key_at(Key::Enter, dialog.content));
        }
        Op::ClickDialog => {
            page.doc.dispatch(&Event::click(dialog.root));
        }
        Op::ClickContent => {
            page.doc.dispatch(&Event::click(dialog.content));
        }
        Op::ClickTrigger => {
            page.doc.dispatch(&Event::click(dialog.close_buttons[0]));
        }
    }
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn controller_tracks_model(
        ops in prop::collection::vec(op(), 0..40),
        escape in any::<bool>(),
        overlay in any::<bool>(),
    ) {
        let page = PageFixture::new();
        let dialog = page.add_dialog("callback-modal", 1);
        let options = PopupOptions::new()
            .close_on_escape(escape)
            .close_on_overlay_click(overlay);
        let popup = Popup::new(&page.doc, dialog.root, options);
        let mut model = Model::default();

        for op in ops {
            run(&page, &dialog, &popup, op);
            model.apply(op, escape, overlay);

            prop_assert_eq!(popup.is_open(), model.open, "after {:?}", op);
            prop_assert_eq!(page.doc.has_class(dialog.root, "showed"), model.open);
            prop_assert_eq!(page.scroll_locked("not-scrollable"), model.open);
            prop_assert_eq!(page.backdrop_has("showed"), model.backdrop);

            let escape_listeners =
                page.doc.listener_count(EventTarget::Document, EventType::KeyDown);
            let overlay_listeners = page.doc.listener_count(dialog.root, EventType::Click);
            prop_assert_eq!(escape_listeners, usize::from(model.open && escape));
            prop_assert_eq!(overlay_listeners, usize::from(model.open && overlay));
            prop_assert_eq!(
                page.doc.listener_count(dialog.close_buttons[0], EventType::Click),
                1
            );
        }
    }

    #[test]
    fn ref_counted_backdrop_is_or_of_open_dialogs(
        ops in prop::collection::vec((any::<bool>(), any::<bool>()), 0..40),
    ) {
        let page = PageFixture::new();
        let options = PopupOptions::new().backdrop_policy(BackdropPolicy::RefCounted);
        let popups: Vec<Popup> = ["first", "second"]
            .into_iter()
            .map(|id| {
                let dialog = page.add_dialog(id, 0);
                Popup::new(&page.doc, dialog.root, options.clone())
            })
            .collect();

        for (second, open) in ops {
            let popup = &popups[usize::from(second)];
            if open {
                popup.open(None);
            } else {
                popup.close(None, false);
            }
            let any_open = popups.iter().any(Popup::is_open);
            prop_assert_eq!(page.backdrop_has("showed"), any_open);
        }
    }
}
