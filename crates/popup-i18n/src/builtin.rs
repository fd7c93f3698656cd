#![forbid(unsafe_code)]

//! Strings shipped with the popup controller.

use std::sync::OnceLock;

use crate::catalog::{LocaleStrings, StringCatalog};

/// Locale used when none is configured, and the last fallback.
pub const DEFAULT_LOCALE: &str = "en";

/// Key of the close-confirmation prompt.
pub const CLOSE_CONFIRM_KEY: &str = "popup.close.confirm";

const CLOSE_PROMPTS: &[(&str, &str)] = &[
    ("en", "Do you really want to close this dialog?"),
    ("ru", "Вы действительно хотите закрыть модальное окно?"),
];

static POPUP_CATALOG: OnceLock<StringCatalog> = OnceLock::new();

/// Catalog with the built-in popup strings, falling back to
/// [`DEFAULT_LOCALE`]. Built on first use.
#[must_use]
pub fn popup_catalog() -> &'static StringCatalog {
    POPUP_CATALOG.get_or_init(build_catalog)
}

fn build_catalog() -> StringCatalog {
    let mut catalog = StringCatalog::new();
    for &(locale, prompt) in CLOSE_PROMPTS {
        let mut strings = LocaleStrings::new();
        strings.insert(CLOSE_CONFIRM_KEY, prompt);
        catalog.add_locale(locale, strings);
    }
    catalog.set_fallback_chain(vec![DEFAULT_LOCALE.into()]);
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_locale_has_the_prompt() {
        let catalog = popup_catalog();
        for &(locale, prompt) in CLOSE_PROMPTS {
            assert_eq!(catalog.get(locale, CLOSE_CONFIRM_KEY), Some(prompt), "{locale}");
        }
    }

    #[test]
    fn unknown_locale_uses_english() {
        let catalog = popup_catalog();
        assert_eq!(
            catalog.get("ja-JP", CLOSE_CONFIRM_KEY),
            catalog.get("en", CLOSE_CONFIRM_KEY)
        );
        assert_ne!(
            catalog.get("ru-RU", CLOSE_CONFIRM_KEY),
            catalog.get("en", CLOSE_CONFIRM_KEY)
        );
    }

    #[test]
    fn catalog_is_built_once() {
        assert!(std::ptr::eq(popup_catalog(), popup_catalog()));
    }
}
