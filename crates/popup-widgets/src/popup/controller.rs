#![forbid(unsafe_code)]

//! The dialog state machine.
//!
//! # State Machine
//!
//! ```text
//!            construction error
//!   new() ─────────────────────────▶ Errored (terminal, inert)
//!     │
//!     ▼
//!   Closed ◀──── close() / overlay / Escape / trigger ──── Open
//!     │                                                      ▲
//!     └──────────────────────── open() ──────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. An errored controller never touches the document after construction.
//! 2. `is_open()` is true exactly after this controller's own open.
//! 3. Overlay and Escape handlers are registered only while open, at most
//!    once each.
//! 4. A close that needs confirmation changes nothing until it is accepted.
//! 5. No `RefCell` borrow is held while the document or the confirmation
//!    provider runs, so handlers and providers may re-enter the controller.

use core::fmt;
use std::cell::RefCell;
use std::rc::Rc;

use popup_core::{Document, Event, Key, Listener, NodeId};

use super::backdrop::BackdropHandle;
use super::confirm::{AlwaysAccept, ConfirmProvider, Confirmation};
use super::error::{ConfigError, ConfigWarning, ErrorReport};
use super::listeners::ListenerRegistry;
use super::options::{PopupConfig, PopupOptions, Target, resolve};

/// Lifecycle phase of a [`Popup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupPhase {
    /// Construction failed; every operation is a no-op.
    Errored,
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingClose {
    skip_backdrop_close: bool,
}

#[derive(Debug)]
struct PopupState {
    phase: PopupPhase,
    pending_close: Option<PendingClose>,
    backdrop: BackdropHandle,
}

pub(crate) struct PopupInner {
    document: Document,
    config: Option<PopupConfig>,
    errors: Vec<ConfigError>,
    warnings: Vec<ConfigWarning>,
    close_buttons: Vec<NodeId>,
    listeners: Option<ListenerRegistry>,
    confirm: Box<dyn ConfirmProvider>,
    state: RefCell<PopupState>,
}

/// Controller for one dialog element.
///
/// Cloning gives another handle to the same controller. Construction never
/// fails: check [`has_error`](Self::has_error) afterwards.
///
/// # Example
///
/// ```
/// use popup_core::{Document, Event, Key};
/// use popup_widgets::{Popup, PopupOptions};
///
/// let doc = Document::new();
/// let dialog = doc.create_element("div");
/// doc.set_attribute(dialog, "id", "callback-modal").unwrap();
/// doc.append_child(doc.body().unwrap(), dialog).unwrap();
///
/// let popup = Popup::new(&doc, "#callback-modal", PopupOptions::new());
/// assert!(!popup.has_error().has_error);
///
/// popup.open(None);
/// assert!(doc.has_class(dialog, "showed"));
/// doc.dispatch(&Event::key(Key::Escape));
/// assert!(!popup.is_open());
/// ```
#[derive(Clone)]
pub struct Popup {
    inner: Rc<PopupInner>,
}

impl fmt::Debug for Popup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Popup")
            .field("phase", &self.phase())
            .field("target", &self.inner.config.as_ref().map(|c| c.target))
            .field("errors", &self.inner.errors)
            .field("close_pending", &self.is_close_pending())
            .finish()
    }
}

impl Popup {
    /// Build a controller for `target`. Closes that need confirmation are
    /// always accepted; use [`with_confirm`](Self::with_confirm) to ask.
    pub fn new(document: &Document, target: impl Into<Target>, options: PopupOptions) -> Self {
        Self::build(document, &target.into(), &options, None)
    }

    /// Build a controller that asks `provider` before confirmed closes.
    pub fn with_confirm(
        document: &Document,
        target: impl Into<Target>,
        options: PopupOptions,
        provider: impl ConfirmProvider + 'static,
    ) -> Self {
        Self::build(document, &target.into(), &options, Some(Box::new(provider)))
    }

    fn build(
        document: &Document,
        target: &Target,
        options: &PopupOptions,
        provider: Option<Box<dyn ConfirmProvider>>,
    ) -> Self {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut close_buttons = Vec::new();

        let mut config = match resolve(document, target, options) {
            Ok(resolved) => {
                warnings = resolved.warnings;
                Some(resolved.config)
            }
            Err(err) => {
                errors.push(err);
                None
            }
        };
        if let Some(resolved) = &config {
            let selector = &resolved.close_trigger_selector;
            match document.query_selector_all_within(resolved.target, selector) {
                Ok(triggers) => close_buttons = triggers,
                Err(err) => errors.push(ConfigError::InvalidSelector {
                    selector: selector.clone(),
                    reason: err.to_string(),
                }),
            }
        }
        if !errors.is_empty() {
            config = None;
        }
        if provider.is_none() && config.as_ref().is_some_and(|c| c.require_close_confirmation) {
            warnings.push(ConfigWarning::NoConfirmProvider);
        }

        for err in &errors {
            tracing::error!(dialog = %target, error = %err, "popup construction failed");
        }
        for warning in &warnings {
            tracing::warn!(dialog = %target, %warning, "popup configured with fallback");
        }

        let phase = if config.is_some() {
            PopupPhase::Closed
        } else {
            PopupPhase::Errored
        };
        let inner = Rc::new_cyclic(|weak| PopupInner {
            document: document.clone(),
            listeners: config.as_ref().map(|_| ListenerRegistry::bind(weak)),
            config,
            errors,
            warnings,
            close_buttons,
            confirm: provider.unwrap_or_else(|| Box::new(AlwaysAccept)),
            state: RefCell::new(PopupState {
                phase,
                pending_close: None,
                backdrop: BackdropHandle::default(),
            }),
        });
        if let Some(listeners) = &inner.listeners {
            listeners.attach_close_triggers(document, &inner.close_buttons);
            tracing::debug!(
                dialog = %target,
                close_buttons = inner.close_buttons.len(),
                "popup ready"
            );
        }
        Self { inner }
    }

    /// Show the dialog. Re-opening an open dialog re-applies its classes.
    pub fn open(&self, event: Option<&Event>) {
        self.inner.open(event);
    }

    /// Hide the dialog, asking for confirmation first when configured.
    ///
    /// With `skip_backdrop_close` the backdrop class stays on, so a caller can
    /// switch to another dialog without the backdrop flickering.
    pub fn close(&self, event: Option<&Event>, skip_backdrop_close: bool) {
        self.inner.close(event, skip_backdrop_close);
    }

    /// Complete a close whose confirmation was deferred. Declining keeps the
    /// dialog open. Returns `false` when no close was pending.
    pub fn resolve_close_confirmation(&self, accepted: bool) -> bool {
        self.inner.resolve_close_confirmation(accepted)
    }

    /// Close without confirmation and remove every listener this controller
    /// registered, close triggers included.
    pub fn detach(&self) {
        self.inner.detach();
    }

    #[must_use]
    pub fn has_error(&self) -> ErrorReport {
        ErrorReport::from_errors(&self.inner.errors)
    }

    #[must_use]
    pub fn errors(&self) -> &[ConfigError] {
        &self.inner.errors
    }

    /// Recoverable construction problems, in the order they were found.
    #[must_use]
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.inner.warnings
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.phase() == PopupPhase::Open
    }

    #[must_use]
    pub fn phase(&self) -> PopupPhase {
        self.inner.state.borrow().phase
    }

    /// Whether a deferred confirmation is outstanding.
    #[must_use]
    pub fn is_close_pending(&self) -> bool {
        self.inner.state.borrow().pending_close.is_some()
    }

    /// Close triggers found at construction.
    #[must_use]
    pub fn close_buttons(&self) -> &[NodeId] {
        &self.inner.close_buttons
    }

    /// Resolved configuration; `None` for an errored controller.
    #[must_use]
    pub fn config(&self) -> Option<&PopupConfig> {
        self.inner.config.as_ref()
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    /// The bound open handler, for wiring host trigger buttons.
    #[must_use]
    pub fn open_listener(&self) -> Option<Listener> {
        self.inner.listeners.as_ref().map(|l| l.open.clone())
    }

    /// The bound close handler, as attached to the close triggers.
    #[must_use]
    pub fn close_listener(&self) -> Option<Listener> {
        self.inner.listeners.as_ref().map(|l| l.close.clone())
    }

    #[cfg(test)]
    fn registry(&self) -> Option<&ListenerRegistry> {
        self.inner.listeners.as_ref()
    }
}

impl PopupInner {
    fn ready(&self, action: &'static str) -> Option<(&PopupConfig, &ListenerRegistry)> {
        match (&self.config, &self.listeners) {
            (Some(config), Some(listeners)) => Some((config, listeners)),
            _ => {
                let errors: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
                tracing::error!(action, ?errors, "popup has construction errors, ignoring");
                None
            }
        }
    }

    fn phase(&self) -> PopupPhase {
        self.state.borrow().phase
    }

    /// `<body>` and `<html>`, the nodes that carry the scroll lock.
    fn scroll_roots(&self) -> impl Iterator<Item = NodeId> {
        [self.document.body(), self.document.document_element()]
            .into_iter()
            .flatten()
    }

    pub(crate) fn open(&self, event: Option<&Event>) {
        let Some((config, listeners)) = self.ready("open") else {
            return;
        };
        let _span = tracing::debug_span!(
            "popup_transition",
            action = "open",
            dialog = %config.target,
            event = ?event.map(Event::event_type)
        )
        .entered();

        let document = &self.document;
        document.add_class(config.target, &config.active_class);
        for node in self.scroll_roots() {
            document.add_class(node, &config.body_lock_class);
        }
        let mut backdrop = self.state.borrow().backdrop;
        backdrop.show(document, &config.backdrop, config.backdrop_policy);
        listeners.attach_transient(document, config);

        let mut state = self.state.borrow_mut();
        state.backdrop = backdrop;
        state.phase = PopupPhase::Open;
        tracing::debug!("popup opened");
    }

    pub(crate) fn close(&self, event: Option<&Event>, skip_backdrop_close: bool) {
        let Some((config, listeners)) = self.ready("close") else {
            return;
        };
        let _span = tracing::debug_span!(
            "popup_transition",
            action = "close",
            dialog = %config.target,
            event = ?event.map(Event::event_type),
            skip_backdrop_close
        )
        .entered();

        if config.require_close_confirmation {
            if self.state.borrow().pending_close.is_some() {
                tracing::debug!("close already awaiting confirmation");
                return;
            }
            match self.confirm.confirm(&config.confirm_message) {
                Confirmation::Accept => {}
                Confirmation::Decline => {
                    tracing::debug!("close declined");
                    return;
                }
                Confirmation::Defer => {
                    self.state.borrow_mut().pending_close = Some(PendingClose {
                        skip_backdrop_close,
                    });
                    tracing::debug!("close deferred");
                    return;
                }
            }
        }
        self.hide(config, listeners, skip_backdrop_close);
    }

    fn hide(&self, config: &PopupConfig, listeners: &ListenerRegistry, skip_backdrop_close: bool) {
        let document = &self.document;
        document.remove_class(config.target, &config.active_class);
        for node in self.scroll_roots() {
            document.remove_class(node, &config.body_lock_class);
        }
        let mut backdrop = self.state.borrow().backdrop;
        backdrop.hide(
            document,
            &config.backdrop,
            config.backdrop_policy,
            skip_backdrop_close,
        );
        listeners.detach_transient(document, config);

        let mut state = self.state.borrow_mut();
        state.backdrop = backdrop;
        state.phase = PopupPhase::Closed;
        state.pending_close = None;
        tracing::debug!("popup closed");
    }

    fn resolve_close_confirmation(&self, accepted: bool) -> bool {
        let pending = self.state.borrow_mut().pending_close.take();
        let Some(pending) = pending else {
            return false;
        };
        let Some((config, listeners)) = self.ready("resolve_close_confirmation") else {
            return false;
        };
        tracing::debug!(dialog = %config.target, accepted, "deferred close resolved");
        if accepted {
            self.hide(config, listeners, pending.skip_backdrop_close);
        }
        true
    }

    fn detach(&self) {
        let (Some(config), Some(listeners)) = (&self.config, &self.listeners) else {
            return;
        };
        if self.phase() == PopupPhase::Open {
            self.hide(config, listeners, false);
        } else {
            listeners.detach_transient(&self.document, config);
        }
        listeners.detach_close_triggers(&self.document, &self.close_buttons);
        tracing::debug!(dialog = %config.target, "popup detached");
    }

    /// Closes only for clicks that land on the dialog element itself.
    pub(crate) fn on_overlay_click(&self, event: &Event) {
        if let Some(config) = &self.config
            && event.target() == Some(config.target)
        {
            self.close(Some(event), false);
        }
    }

    pub(crate) fn on_key_down(&self, event: &Event) {
        if event.key_value().is_some_and(Key::is_escape) {
            self.close(Some(event), false);
        }
    }
}
