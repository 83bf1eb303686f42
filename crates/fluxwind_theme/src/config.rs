//! Theme configuration
//!
//! A [`ThemeConfig`] names a theme and optionally carries the CSS custom
//! properties it wants set on the surface. Identifiers are plain strings
//! on purpose - any name is legal, so applications can define their own
//! themes without touching this crate.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// CSS custom property overrides, keyed by `--fw-*` property name
pub type ThemeVariables = FxHashMap<String, String>;

/// A theme that can be applied directly, not merely referenced by name
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Theme identifier, e.g. `"light"`, `"dark"`, `"sepia"`
    pub name: String,

    /// Human-readable display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Custom properties to set when this theme is applied
    #[serde(default, skip_serializing_if = "ThemeVariables::is_empty")]
    pub variables: ThemeVariables,

    /// Identifier of a theme this one builds on. Documentary only: no
    /// variable inheritance is performed here, authors pre-merge with
    /// [`merge_theme_variables`] when they want it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
}

impl ThemeConfig {
    /// Minimal config carrying only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse a config from a TOML document
    pub fn from_toml_str(raw: &str) -> Result<Self, ThemeConfigError> {
        let config: Self = toml::from_str(raw)?;
        if config.name.is_empty() {
            return Err(ThemeConfigError::MissingName);
        }
        Ok(config)
    }
}

impl From<&str> for ThemeConfig {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for ThemeConfig {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}

/// Theme configuration errors
#[derive(Error, Debug)]
pub enum ThemeConfigError {
    /// Document is not valid TOML for a theme config
    #[error("invalid theme config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config has an empty theme name
    #[error("theme config is missing a name")]
    MissingName,
}

/// Shallow-merge two variable maps; `overrides` wins per key
pub fn merge_theme_variables(base: &ThemeVariables, overrides: &ThemeVariables) -> ThemeVariables {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}
