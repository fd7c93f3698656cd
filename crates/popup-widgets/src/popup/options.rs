#![forbid(unsafe_code)]

//! Caller options and their resolution into a [`PopupConfig`].
//!
//! Every option is "default unless explicitly provided": a provided `false`
//! or `""` is kept as given. Resolution is the only place defaults are
//! applied; the controller only ever sees a fully-populated config.
//!
//! # Failure Modes
//!
//! | Input | Outcome |
//! |-------|---------|
//! | Target is a text node | `ConfigError::InvalidSelectorType` |
//! | Target selector cannot be parsed | `ConfigError::InvalidSelector` |
//! | Target selector matches nothing, or `Target::Null` | `ConfigError::NoTargetElement` |
//! | Close-trigger selector cannot be parsed | `ConfigError::InvalidSelector` |
//! | Custom backdrop does not resolve | `ConfigWarning::BackdropUnresolved`, default kept |
//! | No backdrop in the page | `ConfigWarning::BackdropMissing` |
//! | Unusable locale tag | `ConfigWarning::InvalidLocale`, default locale |

use popup_core::{Document, NodeId, SelectorList};
use popup_i18n::{CLOSE_CONFIRM_KEY, DEFAULT_LOCALE, normalize_locale, popup_catalog};

use super::error::{ConfigError, ConfigWarning};

/// Class toggled on the dialog while it is open.
pub const DEFAULT_ACTIVE_CLASS: &str = "showed";
/// Class toggled on `<html>` and `<body>` while a dialog is open.
pub const DEFAULT_BODY_LOCK_CLASS: &str = "not-scrollable";
/// Selector of the page-level shared backdrop.
pub const DEFAULT_BACKDROP_SELECTOR: &str = ".bg-darkener";
/// Class toggled on the backdrop while a dialog is open.
pub const DEFAULT_BACKDROP_ACTIVE_CLASS: &str = "showed";
/// Selector of close triggers inside the dialog.
pub const DEFAULT_CLOSE_TRIGGER_SELECTOR: &str = "[data-close]";

/// A reference to an element: a selector, a node, or nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Deserialize), serde(from = "String"))]
pub enum Target {
    /// Resolved with a single document query (first match).
    Selector(String),
    /// Used directly; must be an element.
    Node(NodeId),
    /// An absent reference.
    Null,
}

impl From<&str> for Target {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_owned())
    }
}

impl From<String> for Target {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl From<NodeId> for Target {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

impl From<Option<NodeId>> for Target {
    fn from(node: Option<NodeId>) -> Self {
        node.map_or(Self::Null, Self::Node)
    }
}

impl core::fmt::Display for Target {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Selector(selector) => write!(f, "{selector:?}"),
            Self::Node(node) => write!(f, "{node}"),
            Self::Null => write!(f, "null"),
        }
    }
}

/// How the shared backdrop class is owned across controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "config",
    derive(serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum BackdropPolicy {
    /// Every open adds the class and every close (unless skipped) removes it,
    /// regardless of other dialogs sharing the backdrop.
    #[default]
    Unmanaged,
    /// Each open dialog holds the class; it is removed when the last holder
    /// closes.
    RefCounted,
}

/// Caller-supplied backdrop overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "config",
    derive(serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct BackdropOptions {
    pub element: Option<Target>,
    #[cfg_attr(feature = "config", serde(alias = "activeClass"))]
    pub active_class: Option<String>,
}

impl BackdropOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(mut self, element: impl Into<Target>) -> Self {
        self.element = Some(element.into());
        self
    }

    pub fn active_class(mut self, class: impl Into<String>) -> Self {
        self.active_class = Some(class.into());
        self
    }
}

/// Caller-supplied options. Unset fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "config",
    derive(serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct PopupOptions {
    #[cfg_attr(feature = "config", serde(alias = "activeClass"))]
    pub active_class: Option<String>,
    #[cfg_attr(
        feature = "config",
        serde(alias = "bodyScrollDisabledClass", alias = "bodyLockClass")
    )]
    pub body_lock_class: Option<String>,
    #[cfg_attr(
        feature = "config",
        serde(alias = "closeByClickingOverlay", alias = "closeOnOverlayClick")
    )]
    pub close_on_overlay_click: Option<bool>,
    #[cfg_attr(
        feature = "config",
        serde(alias = "closeByEscape", alias = "closeOnEscape")
    )]
    pub close_on_escape: Option<bool>,
    #[cfg_attr(feature = "config", serde(alias = "bgDarkener"))]
    pub backdrop: Option<BackdropOptions>,
    #[cfg_attr(
        feature = "config",
        serde(alias = "needCloseConfirm", alias = "requireCloseConfirmation")
    )]
    pub require_close_confirmation: Option<bool>,
    #[cfg_attr(feature = "config", serde(alias = "closeTriggerSelector"))]
    pub close_trigger_selector: Option<String>,
    #[cfg_attr(feature = "config", serde(alias = "confirmMessage"))]
    pub confirm_message: Option<String>,
    pub locale: Option<String>,
    #[cfg_attr(feature = "config", serde(alias = "backdropPolicy"))]
    pub backdrop_policy: Option<BackdropPolicy>,
}

impl PopupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_class(mut self, class: impl Into<String>) -> Self {
        self.active_class = Some(class.into());
        self
    }

    pub fn body_lock_class(mut self, class: impl Into<String>) -> Self {
        self.body_lock_class = Some(class.into());
        self
    }

    pub fn close_on_overlay_click(mut self, close: bool) -> Self {
        self.close_on_overlay_click = Some(close);
        self
    }

    pub fn close_on_escape(mut self, close: bool) -> Self {
        self.close_on_escape = Some(close);
        self
    }

    pub fn backdrop(mut self, backdrop: BackdropOptions) -> Self {
        self.backdrop = Some(backdrop);
        self
    }

    pub fn require_close_confirmation(mut self, require: bool) -> Self {
        self.require_close_confirmation = Some(require);
        self
    }

    pub fn close_trigger_selector(mut self, selector: impl Into<String>) -> Self {
        self.close_trigger_selector = Some(selector.into());
        self
    }

    pub fn confirm_message(mut self, message: impl Into<String>) -> Self {
        self.confirm_message = Some(message.into());
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn backdrop_policy(mut self, policy: BackdropPolicy) -> Self {
        self.backdrop_policy = Some(policy);
        self
    }
}

/// Resolved backdrop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackdropConfig {
    /// `None` when the page has no backdrop at all.
    pub element: Option<NodeId>,
    pub active_class: String,
}

/// Fully-populated, immutable controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupConfig {
    pub target: NodeId,
    pub active_class: String,
    pub body_lock_class: String,
    pub close_on_overlay_click: bool,
    pub close_on_escape: bool,
    pub backdrop: BackdropConfig,
    pub require_close_confirmation: bool,
    pub close_trigger_selector: String,
    /// Prompt passed to the confirmation provider.
    pub confirm_message: String,
    pub locale: String,
    pub backdrop_policy: BackdropPolicy,
}

/// Output of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub config: PopupConfig,
    pub warnings: Vec<ConfigWarning>,
}

/// Resolve an element reference against `document`.
pub fn resolve_target(document: &Document, target: &Target) -> Result<NodeId, ConfigError> {
    match target {
        Target::Selector(selector) => match document.query_selector(selector) {
            Ok(Some(node)) => Ok(node),
            Ok(None) => Err(ConfigError::NoTargetElement),
            Err(err) => Err(ConfigError::InvalidSelector {
                selector: selector.clone(),
                reason: err.to_string(),
            }),
        },
        Target::Node(node) if document.is_element(*node) => Ok(*node),
        Target::Node(node) if document.has_node(*node) => Err(ConfigError::InvalidSelectorType),
        Target::Node(_) | Target::Null => Err(ConfigError::NoTargetElement),
    }
}

fn resolve_backdrop(
    document: &Document,
    options: Option<&BackdropOptions>,
    warnings: &mut Vec<ConfigWarning>,
) -> BackdropConfig {
    let default_element = document
        .query_selector(DEFAULT_BACKDROP_SELECTOR)
        .ok()
        .flatten();
    let mut element = default_element;
    if let Some(requested) = options.and_then(|o| o.element.as_ref()) {
        match resolve_target(document, requested) {
            Ok(node) => element = Some(node),
            Err(_) => warnings.push(ConfigWarning::BackdropUnresolved {
                requested: requested.to_string(),
            }),
        }
    }
    if element.is_none() {
        warnings.push(ConfigWarning::BackdropMissing);
    }
    let active_class = options
        .and_then(|o| o.active_class.clone())
        .unwrap_or_else(|| DEFAULT_BACKDROP_ACTIVE_CLASS.to_owned());
    BackdropConfig {
        element,
        active_class,
    }
}

fn resolve_locale(requested: Option<&str>, warnings: &mut Vec<ConfigWarning>) -> String {
    let Some(requested) = requested else {
        return DEFAULT_LOCALE.to_owned();
    };
    normalize_locale(requested).unwrap_or_else(|_| {
        warnings.push(ConfigWarning::InvalidLocale {
            requested: requested.to_owned(),
        });
        DEFAULT_LOCALE.to_owned()
    })
}

/// Merge `options` over the defaults for the dialog `target`.
///
/// Stops at the first fatal problem. Warnings are collected in order.
pub fn resolve(
    document: &Document,
    target: &Target,
    options: &PopupOptions,
) -> Result<Resolved, ConfigError> {
    let target = resolve_target(document, target)?;

    let close_trigger_selector = options
        .close_trigger_selector
        .clone()
        .unwrap_or_else(|| DEFAULT_CLOSE_TRIGGER_SELECTOR.to_owned());
    if let Err(err) = SelectorList::parse(&close_trigger_selector) {
        return Err(ConfigError::InvalidSelector {
            selector: close_trigger_selector,
            reason: err.to_string(),
        });
    }

    let mut warnings = Vec::new();
    let backdrop = resolve_backdrop(document, options.backdrop.as_ref(), &mut warnings);
    let locale = resolve_locale(options.locale.as_deref(), &mut warnings);
    let confirm_message = match &options.confirm_message {
        Some(message) => message.clone(),
        None => popup_catalog()
            .get(&locale, CLOSE_CONFIRM_KEY)
            .unwrap_or_default()
            .to_owned(),
    };

    let config = PopupConfig {
        target,
        active_class: options
            .active_class
            .clone()
            .unwrap_or_else(|| DEFAULT_ACTIVE_CLASS.to_owned()),
        body_lock_class: options
            .body_lock_class
            .clone()
            .unwrap_or_else(|| DEFAULT_BODY_LOCK_CLASS.to_owned()),
        close_on_overlay_click: options.close_on_overlay_click.unwrap_or(true),
        close_on_escape: options.close_on_escape.unwrap_or(true),
        backdrop,
        require_close_confirmation: options.require_close_confirmation.unwrap_or(false),
        close_trigger_selector,
        confirm_message,
        locale,
        backdrop_policy: options.backdrop_policy.unwrap_or_default(),
    };
    Ok(Resolved { config, warnings })
}
