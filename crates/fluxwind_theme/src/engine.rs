//! Theme application engine
//!
//! All surface mutation in this crate goes through [`ThemeEngine`]: it
//! writes the theme marker attribute and `--fw-*` custom properties,
//! coordinates best-effort persistence, and notifies registered change
//! listeners. The engine holds no theme state of its own - the surface and
//! the storage adapter are the only places a theme choice lives.

use crate::config::{ThemeConfig, ThemeVariables};
use crate::storage::StorageAdapter;
use crate::system::SystemPreferenceSource;
use fluxwind_core::{Subscription, ThemeSurface};
use slotmap::{new_key_type, SlotMap};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Attribute carrying the active theme identifier on the surface
pub const THEME_ATTRIBUTE: &str = "data-fw-theme";

/// Reserved prefix of theme-scoped custom properties
pub const VARIABLE_PREFIX: &str = "--fw-";

/// Default persistence key for the theme preference
pub const DEFAULT_STORAGE_KEY: &str = "fluxwind-theme";

/// System default theme identifier
pub const DEFAULT_THEME: &str = "light";

/// Style property used for timed visual transitions
const TRANSITION_PROPERTY: &str = "transition";

/// Options for [`ThemeEngine::apply_theme`] and
/// [`ThemeEngine::toggle_theme`]
#[derive(Clone)]
pub struct ApplyOptions {
    /// Target surface; falls back to the engine's default surface
    pub target: Option<Arc<dyn ThemeSurface>>,
    /// Persist the applied theme name (default true)
    pub persist: bool,
    /// Persistence key; [`DEFAULT_STORAGE_KEY`] when `None`
    pub storage_key: Option<String>,
    /// Transition duration in milliseconds; 0 disables the transition
    pub transition_ms: u64,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            target: None,
            persist: true,
            storage_key: None,
            transition_ms: 0,
        }
    }
}

/// Options for [`ThemeEngine::remove_theme`]
#[derive(Clone, Default)]
pub struct RemoveOptions {
    /// Target surface; falls back to the engine's default surface
    pub target: Option<Arc<dyn ThemeSurface>>,
    /// Also clear the persisted preference (default false)
    pub clear_saved: bool,
    /// Persistence key; [`DEFAULT_STORAGE_KEY`] when `None`
    pub storage_key: Option<String>,
}

/// Options for [`ThemeEngine::init_theme`]
#[derive(Clone)]
pub struct InitOptions {
    /// Target surface; falls back to the engine's default surface
    pub target: Option<Arc<dyn ThemeSurface>>,
    /// Theme used when nothing is persisted and the system expresses no
    /// preference
    pub default_theme: String,
    /// Consult the live system preference before the default (default true)
    pub follow_system: bool,
    /// Persistence key; [`DEFAULT_STORAGE_KEY`] when `None`
    pub storage_key: Option<String>,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            target: None,
            default_theme: DEFAULT_THEME.to_string(),
            follow_system: true,
            storage_key: None,
        }
    }
}

/// Payload delivered to change listeners
#[derive(Clone, Debug, PartialEq)]
pub struct ThemeChange {
    /// Theme that was active before this change, if any
    pub previous: Option<String>,
    /// Theme reported as active now
    pub current: String,
    /// Wall-clock time of the change, milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

new_key_type! {
    struct ListenerId;
}

type ListenerFn = Arc<dyn Fn(&ThemeChange) + Send + Sync>;

/// Applies themes to a surface and owns the change-listener registry.
///
/// The default surface is optional: an engine constructed without one
/// (non-visual host) turns every surface-touching operation into a safe
/// no-op, leaving callers free of environment checks.
pub struct ThemeEngine {
    surface: Option<Arc<dyn ThemeSurface>>,
    storage: Arc<dyn StorageAdapter>,
    source: Arc<dyn SystemPreferenceSource>,
    listeners: Arc<Mutex<SlotMap<ListenerId, ListenerFn>>>,
}

impl ThemeEngine {
    /// Create an engine over the given collaborators
    pub fn new(
        surface: Option<Arc<dyn ThemeSurface>>,
        storage: Arc<dyn StorageAdapter>,
        source: Arc<dyn SystemPreferenceSource>,
    ) -> Self {
        Self {
            surface,
            storage,
            source,
            listeners: Arc::new(Mutex::new(SlotMap::with_key())),
        }
    }

    /// The system preference source this engine consults
    pub fn preference_source(&self) -> &Arc<dyn SystemPreferenceSource> {
        &self.source
    }

    /// Register a change listener; dropping the subscription unregisters it
    pub fn on_change<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ThemeChange) + Send + Sync + 'static,
    {
        let id = self.listeners.lock().unwrap().insert(Arc::new(listener));
        let weak = Arc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = weak.upgrade() {
                listeners.lock().unwrap().remove(id);
            }
        })
    }

    fn notify(&self, previous: Option<String>, current: &str) {
        let change = ThemeChange {
            previous,
            current: current.to_string(),
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0),
        };
        let listeners: Vec<ListenerFn> =
            self.listeners.lock().unwrap().values().cloned().collect();
        for listener in listeners {
            listener(&change);
        }
    }

    fn resolve_target(
        &self,
        explicit: Option<&Arc<dyn ThemeSurface>>,
    ) -> Option<Arc<dyn ThemeSurface>> {
        explicit.cloned().or_else(|| self.surface.clone())
    }

    fn storage_key<'a>(key: Option<&'a str>) -> &'a str {
        key.unwrap_or(DEFAULT_STORAGE_KEY)
    }

    /// Apply a theme (by name or full config) to the target surface.
    ///
    /// Sets the marker attribute and every variable of the config, persists
    /// the name when requested, and notifies change listeners with the
    /// previous/current pair. Without a resolvable target the whole call is
    /// a no-op.
    pub fn apply_theme(&self, theme: impl Into<ThemeConfig>, options: &ApplyOptions) {
        let config = theme.into();
        let Some(target) = self.resolve_target(options.target.as_ref()) else {
            tracing::debug!(theme = %config.name, "apply skipped: no surface");
            return;
        };

        let previous = target.attribute(THEME_ATTRIBUTE);

        if options.transition_ms > 0 {
            self.begin_transition(&target, options.transition_ms);
        }

        target.set_attribute(THEME_ATTRIBUTE, &config.name);
        for (name, value) in &config.variables {
            target.set_style_property(name, value);
        }

        if options.persist {
            self.storage
                .set(Self::storage_key(options.storage_key.as_deref()), &config.name);
        }

        tracing::debug!(previous = ?previous, current = %config.name, "theme applied");
        self.notify(previous, &config.name);
    }

    /// Temporarily enable a color transition on the target, clearing it
    /// once the duration has elapsed so the surface's transition behavior
    /// is not permanently altered.
    fn begin_transition(&self, target: &Arc<dyn ThemeSurface>, duration_ms: u64) {
        let value = format!(
            "background-color {duration_ms}ms ease, color {duration_ms}ms ease, \
             border-color {duration_ms}ms ease"
        );
        target.set_style_property(TRANSITION_PROPERTY, &value);

        // Fire-and-forget: overlapping timers both clear the property,
        // which is idempotent.
        let target = Arc::clone(target);
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(duration_ms));
            target.remove_style_property(TRANSITION_PROPERTY);
        });
    }

    /// Read the active theme marker off the target (default surface when
    /// `None`); `None` when unset or no target resolves
    pub fn get_theme(&self, target: Option<&Arc<dyn ThemeSurface>>) -> Option<String> {
        self.resolve_target(target)?.attribute(THEME_ATTRIBUTE)
    }

    /// Clear the theme marker and every `--fw-` prefixed style property,
    /// leaving unrelated properties untouched.
    ///
    /// Listeners are notified only if a theme was actually active, and the
    /// payload reports [`DEFAULT_THEME`] as current even though the marker
    /// is left absent rather than reset. That asymmetry matches long-
    /// standing observable behavior and is kept deliberately.
    pub fn remove_theme(&self, options: &RemoveOptions) {
        let Some(target) = self.resolve_target(options.target.as_ref()) else {
            return;
        };

        let previous = target.attribute(THEME_ATTRIBUTE);
        target.remove_attribute(THEME_ATTRIBUTE);

        for name in target.style_property_names() {
            if name.starts_with(VARIABLE_PREFIX) {
                target.remove_style_property(&name);
            }
        }

        if options.clear_saved {
            self.storage
                .remove(Self::storage_key(options.storage_key.as_deref()));
        }

        if previous.is_some() {
            tracing::debug!(previous = ?previous, "theme removed");
            self.notify(previous, DEFAULT_THEME);
        }
    }

    /// Switch between light and dark: exactly `"dark"` goes to `"light"`,
    /// everything else (including unset) goes to `"dark"`. Returns the new
    /// identifier.
    pub fn toggle_theme(&self, options: &ApplyOptions) -> String {
        let current = self.get_theme(options.target.as_ref());
        let next = if current.as_deref() == Some("dark") {
            "light"
        } else {
            "dark"
        };
        self.apply_theme(next, options);
        next.to_string()
    }

    /// Resolve and apply the startup theme: persisted preference, then the
    /// live system preference (when `follow_system` and it expresses one),
    /// then the configured default. Never persists - a value that was only
    /// inferred must not be written back as a choice.
    pub fn init_theme(&self, options: &InitOptions) -> String {
        let key = Self::storage_key(options.storage_key.as_deref());
        let apply = ApplyOptions {
            target: options.target.clone(),
            persist: false,
            storage_key: options.storage_key.clone(),
            transition_ms: 0,
        };

        if let Some(saved) = self.storage.get(key) {
            self.apply_theme(saved.as_str(), &apply);
            return saved;
        }

        if options.follow_system {
            if let Some(name) = self.source.current().theme_name() {
                self.apply_theme(name, &apply);
                return name.to_string();
            }
        }

        self.apply_theme(options.default_theme.as_str(), &apply);
        options.default_theme.clone()
    }

    // ========== Preference Persistence ==========

    /// Persist a theme name under `key` (default key when `None`)
    pub fn save_theme_preference(&self, name: &str, key: Option<&str>) {
        self.storage.set(Self::storage_key(key), name);
    }

    /// Read the persisted theme name, if any
    pub fn load_theme_preference(&self, key: Option<&str>) -> Option<String> {
        self.storage.get(Self::storage_key(key))
    }

    /// Clear the persisted theme name
    pub fn clear_theme_preference(&self, key: Option<&str>) {
        self.storage.remove(Self::storage_key(key));
    }
}

/// Build a config on the fly from a name plus variables
pub fn theme_with_variables(name: impl Into<String>, variables: ThemeVariables) -> ThemeConfig {
    ThemeConfig {
        name: name.into(),
        variables,
        ..ThemeConfig::default()
    }
}
