#![forbid(unsafe_code)]

//! Modal dialog controller: options resolution, bound listeners, the
//! open/close state machine, close confirmation, and shared backdrop policy.
//!
//! A [`Popup`] drives one dialog element through class toggles only:
//!
//! - the dialog gets `active_class` while open;
//! - `<html>` and `<body>` get `body_lock_class`;
//! - the page backdrop (`.bg-darkener` by default) gets its own class, under
//!   the configured [`BackdropPolicy`].
//!
//! Close triggers (`[data-close]` by default) inside the dialog close it on
//! click. While open, a click landing on the dialog element itself and the
//! Escape key close it too.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Target cannot be resolved | Controller is `Errored`; `open`/`close` log and do nothing |
//! | Custom backdrop cannot be resolved | Warning; default backdrop is used |
//! | Confirmation declined | Dialog stays open, nothing changes |
//! | Confirmation deferred | Dialog stays open until `resolve_close_confirmation` |

mod backdrop;
#[cfg(feature = "config")]
mod config;
mod confirm;
mod controller;
mod error;
mod listeners;
pub mod options;

#[cfg(feature = "config")]
pub use config::OptionsLoadError;
pub use confirm::{
    AlwaysAccept, AlwaysDecline, ConfirmFn, ConfirmProvider, Confirmation, DeferConfirm,
    ScriptedConfirm, confirm_fn,
};
pub use controller::{Popup, PopupPhase};
pub use error::{ConfigError, ConfigWarning, ErrorReport};
pub use options::{
    BackdropConfig, BackdropOptions, BackdropPolicy, PopupConfig, PopupOptions, Target,
};
