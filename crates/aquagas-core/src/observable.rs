//! # Observable State Holder
//!
//! A framework-free value container with change subscriptions. The sale
//! form session and the notification queue live in one; whatever renders
//! them subscribes and re-reads.
//!
//! ## Notification Order
//! ```text
//! update(f) ──► lock ──► value = f(&value) ──► clone value + callbacks
//!                                                    │
//!                              unlock ◄──────────────┘
//!                                │
//!                                ▼
//!                 each callback(&new_value), in subscription order
//! ```
//!
//! Callbacks run after the lock is released, so a callback may read or
//! even update the same observable.

use std::fmt;
use std::sync::{Arc, Mutex};

/// Handle returned by [`Observable::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    value: T,
    subscribers: Vec<(SubscriptionId, Callback<T>)>,
    next_id: u64,
}

/// Shared, observable value. Clones share the same state.
pub struct Observable<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Observable {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock().expect("Observable mutex poisoned");
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Default + Clone> Default for Observable<T> {
    fn default() -> Self {
        Observable::new(T::default())
    }
}

impl<T: Clone> Observable<T> {
    pub fn new(value: T) -> Self {
        Observable {
            inner: Arc::new(Mutex::new(Inner {
                value,
                subscribers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Current value (cloned).
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Reads the current value without cloning it.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let inner = self.inner.lock().expect("Observable mutex poisoned");
        f(&inner.value)
    }

    /// Replaces the value and notifies subscribers.
    pub fn set(&self, value: T) {
        self.update(|_| value);
    }

    /// Computes the next value from the current one and notifies
    /// subscribers. Returns the new value.
    pub fn update<F>(&self, f: F) -> T
    where
        F: FnOnce(&T) -> T,
    {
        self.modify(|value| {
            *value = f(value);
            value.clone()
        })
    }

    /// Mutates the value in place, notifies subscribers and returns
    /// whatever `f` returns.
    pub fn modify<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let (result, value, callbacks) = {
            let mut inner = self.inner.lock().expect("Observable mutex poisoned");
            let result = f(&mut inner.value);
            let callbacks: Vec<Callback<T>> =
                inner.subscribers.iter().map(|(_, cb)| Arc::clone(cb)).collect();
            (result, inner.value.clone(), callbacks)
        };

        for callback in callbacks {
            callback(&value);
        }
        result
    }

    /// Registers a change callback. It is not called for the current value.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock().expect("Observable mutex poisoned");
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.subscribers.push((id, Arc::new(callback)));
        id
    }

    /// Removes a callback. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.lock().expect("Observable mutex poisoned");
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sid, _)| *sid != id);
        inner.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .lock()
            .expect("Observable mutex poisoned")
            .subscribers
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    #[test]
    fn test_get_set_update() {
        let counter = Observable::new(1);
        counter.set(5);
        assert_eq!(counter.get(), 5);
        assert_eq!(counter.update(|v| v * 2), 10);
        assert_eq!(counter.modify(|v| std::mem::replace(v, 0)), 10);
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_subscribers_see_new_value() {
        let obs = Observable::new(0i64);
        let seen = Arc::new(AtomicI64::new(-1));
        let seen_cb = Arc::clone(&seen);
        obs.subscribe(move |v| seen_cb.store(*v, Ordering::SeqCst));

        obs.set(42);
        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }

    #[test]
    fn test_unsubscribe() {
        let obs = Observable::new(0);
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_cb = Arc::clone(&calls);
        let id = obs.subscribe(move |_| {
            calls_cb.fetch_add(1, Ordering::SeqCst);
        });

        obs.set(1);
        assert!(obs.unsubscribe(id));
        assert!(!obs.unsubscribe(id));
        obs.set(2);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(obs.subscriber_count(), 0);
    }

    #[test]
    fn test_callback_can_read_observable() {
        let obs = Observable::new(String::from("a"));
        let reader = obs.clone();
        let seen = Arc::new(Mutex::new(String::new()));
        let seen_cb = Arc::clone(&seen);
        obs.subscribe(move |_| {
            *seen_cb.lock().unwrap() = reader.get();
        });

        obs.set("b".to_string());
        assert_eq!(*seen.lock().unwrap(), "b");
    }

    #[test]
    fn test_clones_share_state() {
        let a = Observable::new(vec![1]);
        let b = a.clone();
        b.modify(|v| v.push(2));
        assert_eq!(a.get(), vec![1, 2]);
    }
}
