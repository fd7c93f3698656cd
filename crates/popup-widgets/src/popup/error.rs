#![forbid(unsafe_code)]

//! Construction diagnostics for [`Popup`](super::Popup).
//!
//! Errors never cross the controller's API. Fatal problems are recorded as
//! [`ConfigError`]s and make the instance inert; recoverable ones are recorded
//! as [`ConfigWarning`]s and a default is used instead.

use core::fmt;

/// Fatal construction error. The controller stays inert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The target reference is neither a selector nor an element.
    InvalidSelectorType,
    /// A selector string could not be parsed.
    InvalidSelector { selector: String, reason: String },
    /// The target did not resolve to an element.
    NoTargetElement,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSelectorType => write!(f, "invalid selector type"),
            Self::InvalidSelector { selector, reason } => {
                write!(f, "invalid selector '{selector}': {reason}")
            }
            Self::NoTargetElement => write!(f, "no target element"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Non-fatal construction problem; a default was kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A custom backdrop was given but did not resolve; the page default is used.
    BackdropUnresolved { requested: String },
    /// No backdrop element exists at all; backdrop toggling is skipped.
    BackdropMissing,
    /// The locale tag was unusable; the default locale is used.
    InvalidLocale { requested: String },
    /// Close confirmation is required but no provider was installed; every
    /// close is accepted.
    NoConfirmProvider,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackdropUnresolved { requested } => {
                write!(f, "backdrop {requested} not found, keeping default backdrop")
            }
            Self::BackdropMissing => write!(f, "no backdrop element, backdrop is not toggled"),
            Self::InvalidLocale { requested } => {
                write!(f, "invalid locale {requested:?}, using default")
            }
            Self::NoConfirmProvider => {
                write!(f, "close confirmation required but no provider installed")
            }
        }
    }
}

/// Result of [`Popup::has_error`](super::Popup::has_error).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorReport {
    pub has_error: bool,
    /// Human-readable diagnostics, in the order they were recorded.
    pub errors: Vec<String>,
}

impl ErrorReport {
    pub(crate) fn from_errors(errors: &[ConfigError]) -> Self {
        Self {
            has_error: !errors.is_empty(),
            errors: errors.iter().map(ToString::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_diagnostics() {
        assert_eq!(ConfigError::InvalidSelectorType.to_string(), "invalid selector type");
        assert_eq!(ConfigError::NoTargetElement.to_string(), "no target element");
        let err = ConfigError::InvalidSelector {
            selector: "a:hover".into(),
            reason: "unexpected ':' at offset 1".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid selector 'a:hover': unexpected ':' at offset 1"
        );
    }

    #[test]
    fn report_preserves_order() {
        let report = ErrorReport::from_errors(&[
            ConfigError::NoTargetElement,
            ConfigError::InvalidSelectorType,
        ]);
        assert!(report.has_error);
        assert_eq!(report.errors, vec!["no target element", "invalid selector type"]);
        assert!(!ErrorReport::from_errors(&[]).has_error);
    }
}
