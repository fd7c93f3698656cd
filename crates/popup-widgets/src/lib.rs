#![forbid(unsafe_code)]

//! Dialog controllers built on the popup document model.
//!
//! The [`popup`] module holds the controller: one [`Popup`] per dialog
//! element, sharing a backdrop and the page scroll lock with its peers.

pub mod popup;

pub use popup::{
    AlwaysAccept, AlwaysDecline, BackdropConfig, BackdropOptions, BackdropPolicy, ConfigError,
    ConfigWarning, ConfirmFn, ConfirmProvider, Confirmation, DeferConfirm, ErrorReport, Popup,
    PopupConfig, PopupOptions, PopupPhase, ScriptedConfirm, Target, confirm_fn,
};
#[cfg(feature = "config")]
pub use popup::OptionsLoadError;
