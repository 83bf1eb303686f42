//! Reactive theme store
//!
//! [`ThemeStore`] is the state machine that decides which theme is active
//! right now. It holds three independent cells - the explicit choice, the
//! last observed system preference, and the follow-system flag - and keeps
//! a derived effective-theme cell recomputed from them. Every visible
//! change routes through the [`ThemeEngine`]; the store itself never
//! touches the surface.
//!
//! There is deliberately no process-wide default store. Construct one per
//! owning scope (application wiring, or one per test) and let it drop, or
//! call [`ThemeStore::cleanup`], when the scope ends.

use crate::config::ThemeConfig;
use crate::engine::{ApplyOptions, ThemeEngine, DEFAULT_STORAGE_KEY, DEFAULT_THEME};
use crate::system::SystemPreference;
use fluxwind_core::{Observable, Subscription};
use std::sync::{Arc, Mutex};

/// Transition duration applied to store-driven theme changes after the
/// initial mount
pub const DEFAULT_STORE_TRANSITION_MS: u64 = 200;

/// Construction options for [`ThemeStore`]
#[derive(Clone)]
pub struct ThemeStoreConfig {
    /// Explicit theme at creation (default `"light"`)
    pub initial_theme: String,
    /// Track the system preference from the start (default false)
    pub follow_system: bool,
    /// Persist applied theme names (default true)
    pub persist: bool,
    /// Persistence key (default [`DEFAULT_STORAGE_KEY`])
    pub storage_key: String,
    /// Transition duration for changes after the first application
    pub transition_ms: u64,
}

impl Default for ThemeStoreConfig {
    fn default() -> Self {
        Self {
            initial_theme: DEFAULT_THEME.to_string(),
            follow_system: false,
            persist: true,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            transition_ms: DEFAULT_STORE_TRANSITION_MS,
        }
    }
}

/// Pure derivation of the effective theme.
///
/// The effective theme equals the system reading exactly when following is
/// on and the system expresses a preference; otherwise it is the explicit
/// choice. No other input participates.
pub fn effective_theme_for(
    current: &str,
    system: SystemPreference,
    following: bool,
) -> String {
    if following {
        if let Some(name) = system.theme_name() {
            return name.to_string();
        }
    }
    current.to_string()
}

/// Reactive theme state over a [`ThemeEngine`].
///
/// The store owns at most one live system-preference watch: exactly one
/// while following, none otherwise. Only construction,
/// [`ThemeStore::set_follow_system`], and [`ThemeStore::cleanup`] may
/// start or stop it.
pub struct ThemeStore {
    engine: Arc<ThemeEngine>,
    config: ThemeStoreConfig,

    current_theme: Observable<String>,
    system_theme: Observable<SystemPreference>,
    following_system: Observable<bool>,
    effective_theme: Observable<String>,

    watch: Mutex<Option<Subscription>>,
    // Keeps the effective-theme derivation wired for the store's lifetime
    _derive_subs: Vec<Subscription>,
}

impl ThemeStore {
    /// Create a store and apply its initial effective theme (with the
    /// transition forced off for the first paint)
    pub fn new(engine: Arc<ThemeEngine>, config: ThemeStoreConfig) -> Self {
        let current_theme = Observable::new(config.initial_theme.clone());
        let system_theme = Observable::new(engine.preference_source().current());
        let following_system = Observable::new(config.follow_system);
        let effective_theme = Observable::new(effective_theme_for(
            &current_theme.get(),
            system_theme.get(),
            following_system.get(),
        ));

        let recompute: Arc<dyn Fn() + Send + Sync> = {
            let current = current_theme.clone();
            let system = system_theme.clone();
            let following = following_system.clone();
            let effective = effective_theme.clone();
            Arc::new(move || {
                effective.set(effective_theme_for(
                    &current.get(),
                    system.get(),
                    following.get(),
                ));
            })
        };

        let derive_subs = vec![
            current_theme.subscribe({
                let recompute = Arc::clone(&recompute);
                move |_: &String| recompute()
            }),
            system_theme.subscribe({
                let recompute = Arc::clone(&recompute);
                move |_: &SystemPreference| recompute()
            }),
            following_system.subscribe({
                let recompute = Arc::clone(&recompute);
                move |_: &bool| recompute()
            }),
        ];

        let store = Self {
            engine,
            config,
            current_theme,
            system_theme,
            following_system,
            effective_theme,
            watch: Mutex::new(None),
            _derive_subs: derive_subs,
        };

        store
            .engine
            .apply_theme(store.effective_theme.get().as_str(), &store.apply_options(0));

        if store.config.follow_system {
            store.start_watch();
        }

        store
    }

    fn apply_options(&self, transition_ms: u64) -> ApplyOptions {
        ApplyOptions {
            target: None,
            persist: self.config.persist,
            storage_key: Some(self.config.storage_key.clone()),
            transition_ms,
        }
    }

    fn start_watch(&self) {
        let mut watch = self.watch.lock().unwrap();
        if watch.is_some() {
            return;
        }

        let system = self.system_theme.clone();
        let following = self.following_system.clone();
        let engine = Arc::clone(&self.engine);
        let options = self.apply_options(self.config.transition_ms);

        *watch = Some(self.engine.preference_source().watch(Arc::new(
            move |preference| {
                tracing::debug!(?preference, "system preference changed");
                system.set(preference);
                if following.get() {
                    if let Some(name) = preference.theme_name() {
                        engine.apply_theme(name, &options);
                    }
                }
            },
        )));
    }

    fn stop_watch(&self) {
        // Dropping the subscription detaches the callback; nothing fires
        // after this line.
        self.watch.lock().unwrap().take();
    }

    // ========== Commands ==========

    /// Set the explicit theme and apply it immediately.
    ///
    /// An explicit choice always takes visual effect, even while following
    /// the system; it does not switch following off.
    pub fn set_theme(&self, theme: impl Into<ThemeConfig>) {
        let config = theme.into();
        tracing::debug!(theme = %config.name, "store set_theme");
        self.current_theme.set(config.name.clone());
        self.engine
            .apply_theme(config, &self.apply_options(self.config.transition_ms));
    }

    /// Toggle light/dark based on the effective theme and return the new
    /// identifier
    pub fn toggle_theme(&self) -> String {
        let next = if self.effective_theme.get() == "dark" {
            "light"
        } else {
            "dark"
        };
        self.set_theme(next);
        next.to_string()
    }

    /// Switch system-following on or off.
    ///
    /// Order matters: the flag updates first (recomputing the effective
    /// theme), then the watch starts or stops, then the effective theme is
    /// re-applied so the surface reflects the new mode without waiting for
    /// the next external event.
    pub fn set_follow_system(&self, follow: bool) {
        tracing::debug!(follow, "store set_follow_system");
        self.following_system.set(follow);

        if follow {
            self.start_watch();
        } else {
            self.stop_watch();
        }

        self.engine.apply_theme(
            self.effective_theme.get().as_str(),
            &self.apply_options(self.config.transition_ms),
        );
    }

    /// Cross-check against the surface: the marker actually rendered right
    /// now, independent of what the store believes
    pub fn get_active_theme(&self) -> Option<String> {
        self.engine.get_theme(None)
    }

    /// Stop any active system watch. Safe to call repeatedly; every call
    /// after the first is a no-op.
    pub fn cleanup(&self) {
        self.stop_watch();
    }

    // ========== State Access ==========

    /// Current explicit theme choice
    pub fn current_theme(&self) -> String {
        self.current_theme.get()
    }

    /// Last observed system preference
    pub fn system_theme(&self) -> SystemPreference {
        self.system_theme.get()
    }

    /// Whether the effective theme tracks the system preference
    pub fn is_following_system(&self) -> bool {
        self.following_system.get()
    }

    /// The theme that should be visually active right now
    pub fn effective_theme(&self) -> String {
        self.effective_theme.get()
    }

    /// Cell handle for subscribing to explicit-choice changes
    pub fn current_theme_cell(&self) -> Observable<String> {
        self.current_theme.clone()
    }

    /// Cell handle for subscribing to system-preference changes
    pub fn system_theme_cell(&self) -> Observable<SystemPreference> {
        self.system_theme.clone()
    }

    /// Cell handle for subscribing to follow-system changes
    pub fn following_system_cell(&self) -> Observable<bool> {
        self.following_system.clone()
    }

    /// Cell handle for subscribing to effective-theme changes
    pub fn effective_theme_cell(&self) -> Observable<String> {
        self.effective_theme.clone()
    }

    /// The engine this store applies through
    pub fn engine(&self) -> &Arc<ThemeEngine> {
        &self.engine
    }
}

impl Drop for ThemeStore {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_theme_derivation() {
        use SystemPreference::*;

        // following + expressed preference wins
        assert_eq!(effective_theme_for("sepia", Dark, true), "dark");
        assert_eq!(effective_theme_for("sepia", Light, true), "light");

        // no-preference falls back to the explicit choice
        assert_eq!(effective_theme_for("sepia", NoPreference, true), "sepia");

        // not following ignores the system entirely
        assert_eq!(effective_theme_for("sepia", Dark, false), "sepia");
        assert_eq!(effective_theme_for("light", NoPreference, false), "light");
    }
}
