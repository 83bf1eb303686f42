//! Fluxwind Theme Management Core
//!
//! Tracks the active visual theme, keeps it in sync with the operating
//! system's color-scheme preference, persists the user's choice, and
//! propagates `--fw-*` custom properties to the rendering surface.
//!
//! # Overview
//!
//! - [`ThemeStore`]: the reactive core - explicit choice, observed system
//!   preference, follow-system flag, and the derived effective theme
//! - [`ThemeEngine`]: the only place surface mutation happens - marker
//!   attribute, variable application, persistence, change notification
//! - [`SystemPreferenceSource`]: reads and watches the host's light/dark
//!   preference; degrades to no-preference/no-op on incapable hosts
//! - [`StorageAdapter`]: best-effort key/value persistence; failures are
//!   swallowed, never fatal
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use fluxwind_core::MemorySurface;
//! use fluxwind_theme::{
//!     MemoryStorage, MockPreferenceSource, SystemPreference, ThemeEngine,
//!     ThemeStore, ThemeStoreConfig,
//! };
//!
//! let engine = Arc::new(ThemeEngine::new(
//!     Some(Arc::new(MemorySurface::new())),
//!     Arc::new(MemoryStorage::new()),
//!     Arc::new(MockPreferenceSource::with_preference(SystemPreference::Dark)),
//! ));
//!
//! let store = ThemeStore::new(engine, ThemeStoreConfig::default());
//! assert_eq!(store.effective_theme(), "light");
//!
//! store.set_follow_system(true);
//! assert_eq!(store.effective_theme(), "dark");
//! assert_eq!(store.get_active_theme().as_deref(), Some("dark"));
//! ```
//!
//! # Failure semantics
//!
//! Environment absence is never an error: without a surface the engine is
//! a no-op, without storage persistence silently stops, without a
//! preference capability the system reads as no-preference and watches do
//! nothing. In the worst case the store still functions as a pure
//! in-memory state holder.

pub mod config;
pub mod engine;
pub mod platform;
pub mod storage;
pub mod store;
pub mod system;

#[cfg(feature = "watcher")]
pub mod watcher;

// Re-export commonly used types
pub use config::{merge_theme_variables, ThemeConfig, ThemeConfigError, ThemeVariables};
pub use engine::{
    theme_with_variables, ApplyOptions, InitOptions, RemoveOptions, ThemeChange, ThemeEngine,
    DEFAULT_STORAGE_KEY, DEFAULT_THEME, THEME_ATTRIBUTE, VARIABLE_PREFIX,
};
pub use platform::detect_system_preference;
pub use storage::{FileStorage, MemoryStorage, StorageAdapter};
pub use store::{
    effective_theme_for, ThemeStore, ThemeStoreConfig, DEFAULT_STORE_TRANSITION_MS,
};
pub use system::{
    MockPreferenceSource, NativePreferenceSource, PreferenceCallback, SystemPreference,
    SystemPreferenceSource,
};

#[cfg(feature = "watcher")]
pub use watcher::{PollingPreferenceSource, WatcherConfig};
