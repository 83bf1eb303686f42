//! Observable cells with synchronous change notification
//!
//! `Observable<T>` is a deliberately small reactive primitive: one value,
//! a set of subscriber callbacks, and an equality check before notifying.
//! Derived values are plain recomputations wired up by the owner through
//! `subscribe`, so there is no dependency graph to maintain and no scheduler
//! involved - a write notifies subscribers before `set` returns.

use slotmap::{new_key_type, SlotMap};
use std::sync::{Arc, Mutex};

new_key_type! {
    /// Key identifying one subscriber of an [`Observable`]
    pub struct SubscriberId;
}

type SubscriberFn<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    value: Mutex<T>,
    subscribers: Mutex<SlotMap<SubscriberId, SubscriberFn<T>>>,
}

/// A single reactive value with subscriber callbacks.
///
/// `Observable` is a cheap handle (`Arc` inside); clones share the same
/// underlying cell, which lets callbacks capture the cells they need
/// without borrowing from an owning struct.
///
/// Writes are equality-gated: `set` with a value equal to the current one
/// is a no-op and notifies nobody. Notification is synchronous and happens
/// after the value lock is released, so a subscriber may freely read the
/// cell (or other cells) from inside its callback.
pub struct Observable<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Observable<T> {
    /// Create a new cell holding `value`
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Inner {
                value: Mutex::new(value),
                subscribers: Mutex::new(SlotMap::with_key()),
            }),
        }
    }

    /// Get a clone of the current value
    pub fn get(&self) -> T {
        self.inner.value.lock().unwrap().clone()
    }

    /// Set a new value, notifying subscribers if it differs from the
    /// current one
    pub fn set(&self, value: T) {
        {
            let mut current = self.inner.value.lock().unwrap();
            if *current == value {
                return;
            }
            *current = value.clone();
        }

        // Snapshot the callbacks so a subscriber can register or cancel
        // subscriptions on this same cell without deadlocking.
        let callbacks: Vec<SubscriberFn<T>> = {
            let subscribers = self.inner.subscribers.lock().unwrap();
            subscribers.values().cloned().collect()
        };

        tracing::trace!(subscribers = callbacks.len(), "observable cell changed");
        for callback in callbacks {
            callback(&value);
        }
    }

    /// Register a callback invoked with the new value on every change.
    ///
    /// The callback is not invoked with the current value at registration
    /// time. Dropping the returned [`Subscription`] unregisters it.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self
            .inner
            .subscribers
            .lock()
            .unwrap()
            .insert(Arc::new(callback));

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.subscribers.lock().unwrap().remove(id);
            }
        })
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().unwrap().len()
    }
}

/// A registration guard that cancels on drop.
///
/// Returned by [`Observable::subscribe`] and by preference-source watchers;
/// holding the guard keeps the registration alive, and dropping it (or
/// calling [`Subscription::cancel`]) detaches the callback so it is never
/// invoked again. Cancellation is idempotent.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap a cancellation closure
    pub fn new<F: FnOnce() + Send + 'static>(cancel: F) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription that does nothing when cancelled, for hosts without
    /// the underlying capability
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    /// Cancel the registration now instead of waiting for drop
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
