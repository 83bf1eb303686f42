//! System color-scheme preference reading and watching
//!
//! A [`SystemPreferenceSource`] answers "does the OS prefer light or dark
//! right now" and optionally pushes changes to registered watchers. Hosts
//! without the capability expose [`SystemPreference::NoPreference`] and a
//! no-op watch, so callers never need to special-case them.

use crate::platform::detect_system_preference;
use fluxwind_core::Subscription;
use slotmap::{new_key_type, SlotMap};
use std::sync::{Arc, Mutex};

/// The host's light/dark preference.
///
/// Produced only by preference sources; application code never fabricates
/// one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SystemPreference {
    Light,
    Dark,
    /// The host expressed no preference, or has no such facility
    NoPreference,
}

impl SystemPreference {
    /// Resolve a (matches-dark, matches-light) query pair.
    ///
    /// An ambiguous pair - dark no longer matching without light matching
    /// yet - resolves to `NoPreference` rather than retaining a stale
    /// reading.
    pub fn from_matches(dark: bool, light: bool) -> Self {
        if dark {
            Self::Dark
        } else if light {
            Self::Light
        } else {
            Self::NoPreference
        }
    }

    /// Theme identifier this preference maps to, if it expresses one
    pub fn theme_name(self) -> Option<&'static str> {
        match self {
            Self::Light => Some("light"),
            Self::Dark => Some("dark"),
            Self::NoPreference => None,
        }
    }
}

/// Watcher callback invoked with each freshly observed preference
pub type PreferenceCallback = Arc<dyn Fn(SystemPreference) + Send + Sync>;

/// Source of the host's color-scheme preference.
///
/// `watch` registrations are independent: cancelling one watcher must not
/// disturb the others, and a cancelled watcher receives no further
/// invocations.
pub trait SystemPreferenceSource: Send + Sync {
    /// The preference as of right now
    fn current(&self) -> SystemPreference;

    /// Register `callback` for future preference changes.
    ///
    /// Sources without a change-delivery capability return
    /// [`Subscription::noop`] and simply never invoke the callback.
    fn watch(&self, callback: PreferenceCallback) -> Subscription;
}

new_key_type! {
    pub(crate) struct WatcherId;
}

/// Shared watcher registry used by pushing sources
pub(crate) type WatcherRegistry = Arc<Mutex<SlotMap<WatcherId, PreferenceCallback>>>;

pub(crate) fn notify_watchers(registry: &WatcherRegistry, preference: SystemPreference) {
    let callbacks: Vec<PreferenceCallback> =
        registry.lock().unwrap().values().cloned().collect();
    for callback in callbacks {
        callback(preference);
    }
}

pub(crate) fn register_watcher(
    registry: &WatcherRegistry,
    callback: PreferenceCallback,
) -> Subscription {
    let id = registry.lock().unwrap().insert(callback);
    let weak = Arc::downgrade(registry);
    Subscription::new(move || {
        if let Some(registry) = weak.upgrade() {
            registry.lock().unwrap().remove(id);
        }
    })
}

/// Source backed by OS detection; reads are live, changes are not pushed.
///
/// Enable the `watcher` feature and use
/// [`PollingPreferenceSource`](crate::watcher::PollingPreferenceSource)
/// when change delivery is needed.
#[derive(Default)]
pub struct NativePreferenceSource;

impl NativePreferenceSource {
    pub fn new() -> Self {
        Self
    }
}

impl SystemPreferenceSource for NativePreferenceSource {
    fn current(&self) -> SystemPreference {
        detect_system_preference()
    }

    fn watch(&self, _callback: PreferenceCallback) -> Subscription {
        Subscription::noop()
    }
}

/// Deterministic source for tests and previews.
///
/// Holds the raw dark/light match pair; [`MockPreferenceSource::set_matches`]
/// recomputes the preference and notifies watchers synchronously when it
/// changed.
#[derive(Default)]
pub struct MockPreferenceSource {
    state: Mutex<(bool, bool)>,
    watchers: WatcherRegistry,
}

impl MockPreferenceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source already reporting `preference`
    pub fn with_preference(preference: SystemPreference) -> Self {
        let source = Self::new();
        match preference {
            SystemPreference::Dark => source.set_state(true, false),
            SystemPreference::Light => source.set_state(false, true),
            SystemPreference::NoPreference => {}
        }
        source
    }

    fn set_state(&self, dark: bool, light: bool) {
        *self.state.lock().unwrap() = (dark, light);
    }

    /// Update the simulated media query results, notifying watchers if
    /// the resolved preference changed
    pub fn set_matches(&self, dark: bool, light: bool) {
        let previous = self.current();
        self.set_state(dark, light);
        let next = self.current();
        if next != previous {
            notify_watchers(&self.watchers, next);
        }
    }

    /// Convenience for the common case of flipping to one preference
    pub fn set_preference(&self, preference: SystemPreference) {
        match preference {
            SystemPreference::Dark => self.set_matches(true, false),
            SystemPreference::Light => self.set_matches(false, true),
            SystemPreference::NoPreference => self.set_matches(false, false),
        }
    }

    /// Number of live watchers (useful for leak assertions in tests)
    pub fn watcher_count(&self) -> usize {
        self.watchers.lock().unwrap().len()
    }
}

impl SystemPreferenceSource for MockPreferenceSource {
    fn current(&self) -> SystemPreference {
        let (dark, light) = *self.state.lock().unwrap();
        SystemPreference::from_matches(dark, light)
    }

    fn watch(&self, callback: PreferenceCallback) -> Subscription {
        register_watcher(&self.watchers, callback)
    }
}
