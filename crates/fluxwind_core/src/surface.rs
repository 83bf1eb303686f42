//! Rendering surface abstraction
//!
//! The theme engine mutates a "surface": a root element carrying string
//! attributes and CSS-style custom properties. Keeping that behind a trait
//! means the engine and store never touch a concrete rendering tree, and
//! tests or headless hosts can use [`MemorySurface`] instead.

use rustc_hash::FxHashMap;
use std::sync::RwLock;

/// A theme application target.
///
/// Implementations must not panic on unknown names; getters return `None`
/// and removals of absent entries are no-ops.
pub trait ThemeSurface: Send + Sync {
    /// Read an attribute value
    fn attribute(&self, name: &str) -> Option<String>;

    /// Set an attribute value
    fn set_attribute(&self, name: &str, value: &str);

    /// Remove an attribute (no-op if absent)
    fn remove_attribute(&self, name: &str);

    /// Read a style property value
    fn style_property(&self, name: &str) -> Option<String>;

    /// Set a style property value
    fn set_style_property(&self, name: &str, value: &str);

    /// Remove a style property (no-op if absent)
    fn remove_style_property(&self, name: &str);

    /// Names of every currently-set style property
    fn style_property_names(&self) -> Vec<String>;
}

/// In-memory surface used by tests and non-visual hosts
#[derive(Default)]
pub struct MemorySurface {
    attributes: RwLock<FxHashMap<String, String>>,
    styles: RwLock<FxHashMap<String, String>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ThemeSurface for MemorySurface {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.read().unwrap().get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.attributes
            .write()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&self, name: &str) {
        self.attributes.write().unwrap().remove(name);
    }

    fn style_property(&self, name: &str) -> Option<String> {
        self.styles.read().unwrap().get(name).cloned()
    }

    fn set_style_property(&self, name: &str, value: &str) {
        self.styles
            .write()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    fn remove_style_property(&self, name: &str) {
        self.styles.write().unwrap().remove(name);
    }

    fn style_property_names(&self) -> Vec<String> {
        self.styles.read().unwrap().keys().cloned().collect()
    }
}
