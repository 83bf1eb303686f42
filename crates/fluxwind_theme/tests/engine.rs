//! Scenario tests for the theme application engine

use fluxwind_core::{MemorySurface, ThemeSurface};
use fluxwind_theme::{
    theme_with_variables, ApplyOptions, InitOptions, MemoryStorage, MockPreferenceSource,
    RemoveOptions, StorageAdapter, SystemPreference, ThemeChange, ThemeEngine, ThemeVariables,
    DEFAULT_STORAGE_KEY, THEME_ATTRIBUTE,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Wraps an adapter and counts writes, for asserting persistence behavior
struct CountingStorage {
    inner: MemoryStorage,
    writes: AtomicUsize,
}

impl CountingStorage {
    fn new() -> Self {
        Self {
            inner: MemoryStorage::new(),
            writes: AtomicUsize::new(0),
        }
    }

    fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl StorageAdapter for CountingStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value);
    }

    fn remove(&self, key: &str) {
        self.inner.remove(key);
    }
}

struct Fixture {
    surface: Arc<MemorySurface>,
    storage: Arc<CountingStorage>,
    source: Arc<MockPreferenceSource>,
    engine: ThemeEngine,
}

fn fixture() -> Fixture {
    fixture_with_preference(SystemPreference::NoPreference)
}

fn fixture_with_preference(preference: SystemPreference) -> Fixture {
    let surface = Arc::new(MemorySurface::new());
    let storage = Arc::new(CountingStorage::new());
    let source = Arc::new(MockPreferenceSource::with_preference(preference));
    let engine = ThemeEngine::new(
        Some(surface.clone() as Arc<dyn ThemeSurface>),
        storage.clone(),
        source.clone(),
    );
    Fixture {
        surface,
        storage,
        source,
        engine,
    }
}

fn no_persist() -> ApplyOptions {
    ApplyOptions {
        persist: false,
        ..ApplyOptions::default()
    }
}

#[test]
fn apply_then_get_returns_name() {
    let f = fixture();
    for name in [
        "dark",
        "sepia",
        "theme-with.punctuation:v2",
        "a-very-long-theme-name-that-nobody-would-reasonably-type-but-is-still-legal",
    ] {
        f.engine.apply_theme(name, &no_persist());
        assert_eq!(f.engine.get_theme(None).as_deref(), Some(name));
    }
}

#[test]
fn apply_sets_marker_and_variables() {
    let f = fixture();
    let mut variables = ThemeVariables::default();
    variables.insert("--fw-color-primary".to_string(), "#ff0000".to_string());

    f.engine
        .apply_theme(theme_with_variables("custom", variables), &no_persist());

    assert_eq!(f.surface.attribute(THEME_ATTRIBUTE).as_deref(), Some("custom"));
    assert_eq!(
        f.surface.style_property("--fw-color-primary").as_deref(),
        Some("#ff0000")
    );
}

#[test]
fn apply_persists_by_default() {
    let f = fixture();
    f.engine.apply_theme("dark", &ApplyOptions::default());
    assert_eq!(f.storage.get(DEFAULT_STORAGE_KEY).as_deref(), Some("dark"));

    f.engine.apply_theme(
        "sepia",
        &ApplyOptions {
            storage_key: Some("custom-key".to_string()),
            ..ApplyOptions::default()
        },
    );
    assert_eq!(f.storage.get("custom-key").as_deref(), Some("sepia"));
    // the default key is untouched by the custom-key write
    assert_eq!(f.storage.get(DEFAULT_STORAGE_KEY).as_deref(), Some("dark"));
}

#[test]
fn apply_without_persist_writes_nothing() {
    let f = fixture();
    f.engine.apply_theme("dark", &no_persist());
    assert_eq!(f.storage.write_count(), 0);
    assert_eq!(f.storage.get(DEFAULT_STORAGE_KEY), None);
}

#[test]
fn remove_clears_marker_and_only_prefixed_properties() {
    let f = fixture();
    let mut variables = ThemeVariables::default();
    variables.insert("--fw-color-primary".to_string(), "#112233".to_string());
    variables.insert("--fw-spacing-base".to_string(), "4px".to_string());
    f.engine
        .apply_theme(theme_with_variables("custom", variables), &no_persist());

    // unrelated property set independently of the theme system
    f.surface.set_style_property("--app-zoom", "1.5");

    f.engine.remove_theme(&RemoveOptions::default());

    assert_eq!(f.engine.get_theme(None), None);
    assert_eq!(f.surface.style_property("--fw-color-primary"), None);
    assert_eq!(f.surface.style_property("--fw-spacing-base"), None);
    assert_eq!(f.surface.style_property("--app-zoom").as_deref(), Some("1.5"));
}

#[test]
fn remove_can_clear_persisted_preference() {
    let f = fixture();
    f.engine.apply_theme("dark", &ApplyOptions::default());
    f.engine.remove_theme(&RemoveOptions {
        clear_saved: true,
        ..RemoveOptions::default()
    });
    assert_eq!(f.storage.get(DEFAULT_STORAGE_KEY), None);
}

#[test]
fn change_events_carry_previous_and_current() {
    let f = fixture();
    let events: Arc<Mutex<Vec<ThemeChange>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let _sub = f.engine.on_change(move |change| {
        sink.lock().unwrap().push(change.clone());
    });

    f.engine.apply_theme("dark", &no_persist());
    f.engine.apply_theme("sepia", &no_persist());

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].previous, None);
    assert_eq!(events[0].current, "dark");
    assert_eq!(events[1].previous.as_deref(), Some("dark"));
    assert_eq!(events[1].current, "sepia");
    assert!(events[0].timestamp_ms > 0);
}

#[test]
fn remove_notifies_default_theme_but_leaves_marker_absent() {
    let f = fixture();
    f.engine.apply_theme("dark", &no_persist());

    let events: Arc<Mutex<Vec<ThemeChange>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let _sub = f.engine.on_change(move |change| {
        sink.lock().unwrap().push(change.clone());
    });

    f.engine.remove_theme(&RemoveOptions::default());

    // the payload reports the system default while the marker stays unset
    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].previous.as_deref(), Some("dark"));
    assert_eq!(events[0].current, "light");
    assert_eq!(f.engine.get_theme(None), None);
}

#[test]
fn remove_without_active_theme_emits_nothing() {
    let f = fixture();
    let count = Arc::new(AtomicUsize::new(0));
    let sink = count.clone();
    let _sub = f.engine.on_change(move |_| {
        sink.fetch_add(1, Ordering::SeqCst);
    });

    f.engine.remove_theme(&RemoveOptions::default());
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn dropped_listener_receives_nothing() {
    let f = fixture();
    let count = Arc::new(AtomicUsize::new(0));
    let sink = count.clone();
    let sub = f.engine.on_change(move |_| {
        sink.fetch_add(1, Ordering::SeqCst);
    });

    f.engine.apply_theme("dark", &no_persist());
    drop(sub);
    f.engine.apply_theme("light", &no_persist());

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn toggle_follows_the_light_dark_law() {
    let f = fixture();

    // unset counts as not-dark
    assert_eq!(f.engine.toggle_theme(&no_persist()), "dark");
    assert_eq!(f.engine.toggle_theme(&no_persist()), "light");
    assert_eq!(f.engine.toggle_theme(&no_persist()), "dark");

    // any non-dark value toggles to dark
    f.engine.apply_theme("sepia", &no_persist());
    assert_eq!(f.engine.toggle_theme(&no_persist()), "dark");
}

#[test]
fn toggle_twice_from_light_returns_to_light() {
    let f = fixture();
    f.engine.apply_theme("light", &no_persist());
    f.engine.toggle_theme(&no_persist());
    f.engine.toggle_theme(&no_persist());
    assert_eq!(f.engine.get_theme(None).as_deref(), Some("light"));
}

#[test]
fn init_prefers_persisted_value_and_never_writes() {
    let f = fixture_with_preference(SystemPreference::Dark);
    f.storage.set(DEFAULT_STORAGE_KEY, "sepia");
    let writes_before = f.storage.write_count();

    let resolved = f.engine.init_theme(&InitOptions::default());

    assert_eq!(resolved, "sepia");
    assert_eq!(f.engine.get_theme(None).as_deref(), Some("sepia"));
    assert_eq!(f.storage.write_count(), writes_before);
}

#[test]
fn init_falls_back_to_system_preference() {
    let f = fixture_with_preference(SystemPreference::Dark);
    let resolved = f.engine.init_theme(&InitOptions::default());

    assert_eq!(resolved, "dark");
    assert_eq!(f.engine.get_theme(None).as_deref(), Some("dark"));
    assert_eq!(f.storage.write_count(), 0);
}

#[test]
fn init_uses_default_when_system_has_no_preference() {
    let f = fixture();
    let resolved = f.engine.init_theme(&InitOptions {
        default_theme: "sepia".to_string(),
        ..InitOptions::default()
    });

    assert_eq!(resolved, "sepia");
    assert_eq!(f.engine.get_theme(None).as_deref(), Some("sepia"));
}

#[test]
fn init_ignores_system_when_not_following() {
    let f = fixture_with_preference(SystemPreference::Dark);
    let resolved = f.engine.init_theme(&InitOptions {
        follow_system: false,
        ..InitOptions::default()
    });

    assert_eq!(resolved, "light");
}

#[test]
fn transition_property_is_temporary() {
    let f = fixture();
    f.engine.apply_theme(
        "dark",
        &ApplyOptions {
            persist: false,
            transition_ms: 30,
            ..ApplyOptions::default()
        },
    );

    assert!(f.surface.style_property("transition").is_some());

    std::thread::sleep(std::time::Duration::from_millis(200));
    assert_eq!(f.surface.style_property("transition"), None);
    // the applied theme survives the transition clearing
    assert_eq!(f.engine.get_theme(None).as_deref(), Some("dark"));
}

#[test]
fn engine_without_surface_is_a_safe_noop() {
    let storage = Arc::new(CountingStorage::new());
    let engine = ThemeEngine::new(
        None,
        storage.clone(),
        Arc::new(MockPreferenceSource::new()),
    );

    let count = Arc::new(AtomicUsize::new(0));
    let sink = count.clone();
    let _sub = engine.on_change(move |_| {
        sink.fetch_add(1, Ordering::SeqCst);
    });

    engine.apply_theme("dark", &ApplyOptions::default());
    engine.remove_theme(&RemoveOptions::default());
    assert_eq!(engine.toggle_theme(&ApplyOptions::default()), "dark");
    assert_eq!(engine.get_theme(None), None);

    // nothing was persisted and nobody was notified
    assert_eq!(storage.write_count(), 0);
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn preference_wrappers_roundtrip() {
    let f = fixture();
    f.engine.save_theme_preference("dark", None);
    assert_eq!(f.engine.load_theme_preference(None).as_deref(), Some("dark"));

    f.engine.clear_theme_preference(None);
    assert_eq!(f.engine.load_theme_preference(None), None);

    f.engine.save_theme_preference("sepia", Some("alt-key"));
    assert_eq!(
        f.engine.load_theme_preference(Some("alt-key")).as_deref(),
        Some("sepia")
    );
}

#[test]
fn source_changes_do_not_touch_the_engine_without_a_store() {
    // The engine never subscribes on its own; preference flips are inert
    // until a store wires them up.
    let f = fixture_with_preference(SystemPreference::Light);
    f.source.set_preference(SystemPreference::Dark);
    assert_eq!(f.engine.get_theme(None), None);
}
