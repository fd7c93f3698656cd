#![forbid(unsafe_code)]

//! String catalog with locale fallback.
//!
//! # Invariants
//!
//! 1. **Fallback chain terminates**: a lookup tries the requested locale,
//!    its language subtag (`ru-RU` → `ru`), then the configured chain, each
//!    at most once, returning `None` if nothing provides the key.
//!
//! 2. **Immutable after construction**: lookups take `&self` only.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing key | Key not in any locale | Returns `None` |
//! | Missing locale | Locale not loaded | Falls through chain |
//! | Malformed locale tag | Empty after normalization | `Err(I18nError::InvalidLocale)` |

use core::fmt;

use ahash::AHashMap;

/// Locale identifier (e.g., `"en"`, `"en-US"`, `"ru"`).
pub type Locale = String;

/// Errors from i18n operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum I18nError {
    /// A locale string was empty or unusable.
    InvalidLocale(String),
}

impl fmt::Display for I18nError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLocale(l) => write!(f, "invalid locale: {l:?}"),
        }
    }
}

impl std::error::Error for I18nError {}

/// Normalize a locale tag: strip encoding/modifier suffixes (`.UTF-8`,
/// `@euro`), turn `_` into `-`, and map `C`/`POSIX` to `en`.
///
/// ```
/// use popup_i18n::normalize_locale;
/// assert_eq!(normalize_locale("ru_RU.UTF-8").unwrap(), "ru-RU");
/// assert_eq!(normalize_locale("POSIX").unwrap(), "en");
/// assert!(normalize_locale("  ").is_err());
/// ```
pub fn normalize_locale(raw: &str) -> Result<Locale, I18nError> {
    let trimmed = raw.trim();
    let base = trimmed.split('@').next().unwrap_or(trimmed);
    let base = base.split('.').next().unwrap_or(base).trim();
    if base.is_empty() {
        return Err(I18nError::InvalidLocale(raw.to_owned()));
    }
    if base.eq_ignore_ascii_case("c") || base.eq_ignore_ascii_case("posix") {
        return Ok("en".to_owned());
    }
    Ok(base.replace('_', "-"))
}

/// Strings for a single locale.
#[derive(Debug, Clone, Default)]
pub struct LocaleStrings {
    strings: AHashMap<String, String>,
}

impl LocaleStrings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a string, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.strings.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }
}

/// Central string catalog with locale fallback.
///
/// # Example
///
/// ```
/// use popup_i18n::{LocaleStrings, StringCatalog};
///
/// let mut catalog = StringCatalog::new();
/// let mut en = LocaleStrings::new();
/// en.insert("greeting", "Hello");
/// catalog.add_locale("en", en);
/// catalog.set_fallback_chain(vec!["en".into()]);
///
/// assert_eq!(catalog.get("en", "greeting"), Some("Hello"));
/// assert_eq!(catalog.get("de-AT", "greeting"), Some("Hello"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StringCatalog {
    locales: AHashMap<Locale, LocaleStrings>,
    fallback_chain: Vec<Locale>,
}

impl StringCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) strings for a locale.
    pub fn add_locale(&mut self, locale: impl Into<String>, strings: LocaleStrings) {
        self.locales.insert(locale.into(), strings);
    }

    /// Set the fallback chain (tried in order when a key is missing).
    pub fn set_fallback_chain(&mut self, chain: Vec<Locale>) {
        self.fallback_chain = chain;
    }

    /// Locales tried for `locale`, in order, without duplicates.
    #[must_use]
    pub fn resolution_order<'a>(&'a self, locale: &'a str) -> Vec<&'a str> {
        let mut order: Vec<&str> = vec![locale];
        if let Some((language, _)) = locale.split_once('-') {
            order.push(language);
        }
        for fallback in &self.fallback_chain {
            if !order.contains(&fallback.as_str()) {
                order.push(fallback.as_str());
            }
        }
        order
    }

    /// Look up a string by key, walking the resolution order.
    #[must_use]
    pub fn get(&self, locale: &str, key: &str) -> Option<&str> {
        self.resolution_order(locale)
            .into_iter()
            .find_map(|candidate| self.locales.get(candidate)?.get(key))
    }
}
