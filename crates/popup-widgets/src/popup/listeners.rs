#![forbid(unsafe_code)]

//! The controller's bound handlers.
//!
//! Each handler is created once per controller and keeps its [`ListenerId`]
//! for the controller's whole life, so every add has a matching remove and
//! re-adding an attached handler is a no-op in the document.
//!
//! Handlers reach the controller through a `Weak` reference. A handler that
//! outlives its controller does nothing.
//!
//! [`ListenerId`]: popup_core::ListenerId

use std::rc::Weak;

use popup_core::{Document, Event, EventTarget, EventType, Listener, NodeId};

use super::controller::PopupInner;
use super::options::PopupConfig;

#[derive(Debug)]
pub(crate) struct ListenerRegistry {
    pub(crate) open: Listener,
    pub(crate) close: Listener,
    overlay: Listener,
    escape: Listener,
}

fn bound(popup: &Weak<PopupInner>, handler: fn(&PopupInner, &Event)) -> Listener {
    let popup = popup.clone();
    Listener::new(move |event| {
        if let Some(inner) = popup.upgrade() {
            handler(&inner, event);
        }
    })
}

impl ListenerRegistry {
    pub(crate) fn bind(popup: &Weak<PopupInner>) -> Self {
        Self {
            open: bound(popup, |inner, event| inner.open(Some(event))),
            close: bound(popup, |inner, event| inner.close(Some(event), false)),
            overlay: bound(popup, PopupInner::on_overlay_click),
            escape: bound(popup, PopupInner::on_key_down),
        }
    }

    /// Close triggers keep the close handler for the controller's lifetime.
    pub(crate) fn attach_close_triggers(&self, document: &Document, triggers: &[NodeId]) {
        for &trigger in triggers {
            document.add_event_listener(trigger, EventType::Click, &self.close);
        }
    }

    pub(crate) fn detach_close_triggers(&self, document: &Document, triggers: &[NodeId]) {
        for &trigger in triggers {
            document.remove_event_listener(trigger, EventType::Click, &self.close);
        }
    }

    /// Overlay and Escape handlers, attached only while open.
    pub(crate) fn attach_transient(&self, document: &Document, config: &PopupConfig) {
        if config.close_on_overlay_click {
            document.add_event_listener(config.target, EventType::Click, &self.overlay);
        }
        if config.close_on_escape {
            document.add_event_listener(EventTarget::Document, EventType::KeyDown, &self.escape);
        }
    }

    pub(crate) fn detach_transient(&self, document: &Document, config: &PopupConfig) {
        if config.close_on_overlay_click {
            document.remove_event_listener(config.target, EventType::Click, &self.overlay);
        }
        if config.close_on_escape {
            document.remove_event_listener(EventTarget::Document, EventType::KeyDown, &self.escape);
        }
    }

    #[cfg(test)]
    pub(crate) fn overlay(&self) -> &Listener {
        &self.overlay
    }

    #[cfg(test)]
    pub(crate) fn escape(&self) -> &Listener {
        &self.escape
    }
}
