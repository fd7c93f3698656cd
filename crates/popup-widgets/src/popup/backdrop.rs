#![forbid(unsafe_code)]

//! Backdrop class toggling under a [`BackdropPolicy`].
//!
//! # Invariants
//!
//! - Under `RefCounted` a controller holds at most one hold on the backdrop
//!   class, taken on its first show and given back on hide.
//! - Under `Unmanaged` no holds are ever taken; show adds the class and hide
//!   removes it, whatever other dialogs are doing.
//! - A skipped hide never removes the class. Under `RefCounted` it still gives
//!   back this controller's hold, leaving the class on for the next dialog.

use popup_core::Document;

use super::options::{BackdropConfig, BackdropPolicy};

/// One controller's view of the shared backdrop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct BackdropHandle {
    held: bool,
}

impl BackdropHandle {
    /// Whether this controller currently holds the backdrop class.
    pub(crate) fn is_held(self) -> bool {
        self.held
    }

    pub(crate) fn show(
        &mut self,
        document: &Document,
        backdrop: &BackdropConfig,
        policy: BackdropPolicy,
    ) {
        let Some(element) = backdrop.element else {
            return;
        };
        match policy {
            BackdropPolicy::Unmanaged => {
                document.add_class(element, &backdrop.active_class);
            }
            BackdropPolicy::RefCounted => {
                if !self.held {
                    let holds = document.acquire_class(element, &backdrop.active_class);
                    tracing::trace!(holds, "backdrop hold acquired");
                    self.held = true;
                }
            }
        }
    }

    pub(crate) fn hide(
        &mut self,
        document: &Document,
        backdrop: &BackdropConfig,
        policy: BackdropPolicy,
        skip: bool,
    ) {
        let Some(element) = backdrop.element else {
            return;
        };
        match policy {
            BackdropPolicy::Unmanaged => {
                if !skip {
                    document.remove_class(element, &backdrop.active_class);
                }
            }
            BackdropPolicy::RefCounted if self.held => {
                let holds = if skip {
                    document.drop_class_hold(element, &backdrop.active_class)
                } else {
                    document.release_class(element, &backdrop.active_class)
                };
                tracing::trace!(holds, skip, "backdrop hold released");
                self.held = false;
            }
            BackdropPolicy::RefCounted => {}
        }
    }
}
