//! Polling system preference watcher (feature `watcher`)
//!
//! Native hosts here have no push channel for color-scheme changes, so
//! this source re-detects the preference on a background thread at a
//! fixed interval and notifies watchers when the reading changes. The
//! thread is spawned lazily with the first watch and stops when the
//! source is dropped.

use crate::platform::detect_system_preference;
use crate::system::{
    notify_watchers, register_watcher, PreferenceCallback, SystemPreference,
    SystemPreferenceSource, WatcherRegistry,
};
use fluxwind_core::Subscription;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Polling configuration
#[derive(Clone, Copy, Debug)]
pub struct WatcherConfig {
    /// Time between detection probes
    pub interval: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
        }
    }
}

/// A [`SystemPreferenceSource`] that polls OS detection for changes
pub struct PollingPreferenceSource {
    config: WatcherConfig,
    watchers: WatcherRegistry,
    running: Arc<AtomicBool>,
    spawned: Mutex<bool>,
}

impl PollingPreferenceSource {
    pub fn new(config: WatcherConfig) -> Self {
        Self {
            config,
            watchers: WatcherRegistry::default(),
            running: Arc::new(AtomicBool::new(true)),
            spawned: Mutex::new(false),
        }
    }

    /// Number of live watchers
    pub fn watcher_count(&self) -> usize {
        self.watchers.lock().unwrap().len()
    }

    fn ensure_poll_thread(&self) {
        let mut spawned = self.spawned.lock().unwrap();
        if *spawned {
            return;
        }
        *spawned = true;

        let interval = self.config.interval;
        let watchers = Arc::clone(&self.watchers);
        let running = Arc::clone(&self.running);

        std::thread::spawn(move || {
            let mut last = detect_system_preference();
            tracing::debug!(?last, ?interval, "preference poll thread started");

            while running.load(Ordering::SeqCst) {
                std::thread::sleep(interval);
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                let next = detect_system_preference();
                if next != last {
                    tracing::debug!(from = ?last, to = ?next, "system preference changed");
                    last = next;
                    notify_watchers(&watchers, next);
                }
            }

            tracing::debug!("preference poll thread stopped");
        });
    }
}

impl Default for PollingPreferenceSource {
    fn default() -> Self {
        Self::new(WatcherConfig::default())
    }
}

impl SystemPreferenceSource for PollingPreferenceSource {
    fn current(&self) -> SystemPreference {
        detect_system_preference()
    }

    fn watch(&self, callback: PreferenceCallback) -> Subscription {
        self.ensure_poll_thread();
        register_watcher(&self.watchers, callback)
    }
}

impl Drop for PollingPreferenceSource {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
