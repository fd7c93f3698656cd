#![forbid(unsafe_code)]

//! Loading [`PopupOptions`] from JSON or TOML.
//!
//! Field names are accepted in snake_case and in the legacy camelCase
//! spelling (`needCloseConfirm`, `bgDarkener`, ...). Unknown fields are
//! rejected so a typo cannot silently fall back to a default.
//!
//! ```toml
//! active_class = "opened"
//! closeByEscape = false
//! backdrop_policy = "ref_counted"
//!
//! [bgDarkener]
//! element = ".page-darkener"
//! activeClass = "opened"
//! ```

use core::fmt;
use std::path::{Path, PathBuf};

use super::options::PopupOptions;

/// Errors from loading options.
#[derive(Debug)]
pub enum OptionsLoadError {
    Json(serde_json::Error),
    Toml(toml::de::Error),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file extension is neither `.json` nor `.toml`.
    UnknownFormat(PathBuf),
}

impl fmt::Display for OptionsLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid popup options JSON: {err}"),
            Self::Toml(err) => write!(f, "invalid popup options TOML: {err}"),
            Self::Io { path, source } => {
                write!(f, "cannot read popup options {}: {source}", path.display())
            }
            Self::UnknownFormat(path) => {
                write!(f, "unknown popup options format: {}", path.display())
            }
        }
    }
}

impl std::error::Error for OptionsLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Toml(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::UnknownFormat(_) => None,
        }
    }
}

impl From<serde_json::Error> for OptionsLoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<toml::de::Error> for OptionsLoadError {
    fn from(err: toml::de::Error) -> Self {
        Self::Toml(err)
    }
}

impl PopupOptions {
    pub fn from_json_str(json: &str) -> Result<Self, OptionsLoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, OptionsLoadError> {
        Ok(toml::from_str(text)?)
    }

    /// Load options from a `.json` or `.toml` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, OptionsLoadError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let parse: fn(&str) -> Result<Self, OptionsLoadError> = match extension.as_deref() {
            Some("json") => Self::from_json_str,
            Some("toml") => Self::from_toml_str,
            _ => return Err(OptionsLoadError::UnknownFormat(path.to_path_buf())),
        };
        let contents = std::fs::read_to_string(path).map_err(|source| OptionsLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let options = parse(&contents)?;
        tracing::debug!(path = %path.display(), "popup options loaded");
        Ok(options)
    }
}
