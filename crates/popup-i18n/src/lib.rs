#![forbid(unsafe_code)]

//! Localized strings for popup dialogs.
//!
//! - [`catalog`]: locale-keyed string tables with a fallback chain, and
//!   locale tag normalization.
//! - [`builtin`]: the strings shipped with the controller (confirmation
//!   prompt in English and Russian).

pub mod builtin;
pub mod catalog;

pub use builtin::{CLOSE_CONFIRM_KEY, DEFAULT_LOCALE, popup_catalog};
pub use catalog::{I18nError, Locale, LocaleStrings, StringCatalog, normalize_locale};
