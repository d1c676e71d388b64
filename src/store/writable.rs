//! Writable and read-only stores with a start/stop lifecycle.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use super::types::{Readable, StopNotifier, SubscriberFn, SubscriberId, Unsubscriber};

type StartFn<T> = dyn Fn(Setter<T>) -> StopNotifier + Send + Sync;

/// Mutable store state, guarded by the store's lock.
struct State<T> {
    value: T,
    subscribers: Vec<(SubscriberId, Arc<SubscriberFn<T>>)>,
    /// Deactivation callback of the current activation, if any.
    stop: Option<StopNotifier>,
    /// The start notifier is running. Writes update the value silently.
    starting: bool,
}

struct Inner<T> {
    state: Mutex<State<T>>,
    start: Option<Box<StartFn<T>>>,
    next_id: AtomicU64,
}

impl<T: Clone + Send + Sync + 'static> Inner<T> {
    fn set(&self, value: T) {
        self.write(|_| value);
    }

    fn update(&self, f: impl FnOnce(&T) -> T) {
        self.write(f);
    }

    fn write(&self, f: impl FnOnce(&T) -> T) {
        let (value, subscribers) = {
            let mut state = self.state.lock();
            state.value = f(&state.value);
            if state.starting {
                return;
            }
            (state.value.clone(), Self::snapshot(&state))
        };
        Self::notify(&value, subscribers);
    }

    fn subscribe(self: &Arc<Self>, run: Arc<SubscriberFn<T>>) -> Unsubscriber {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let activate = {
            let mut state = self.state.lock();
            state.subscribers.push((id, Arc::clone(&run)));
            let activate = state.subscribers.len() == 1 && self.start.is_some();
            state.starting |= activate;
            activate
        };

        let value = match (&self.start, activate) {
            (Some(start), true) => {
                let stop = start(Setter {
                    inner: Arc::downgrade(self),
                });
                let mut state = self.state.lock();
                state.starting = false;
                state.stop = Some(stop);
                state.value.clone()
            }
            _ => self.state.lock().value.clone(),
        };
        run(&value);

        let inner = Arc::downgrade(self);
        Unsubscriber::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.unsubscribe(id);
            }
        })
    }

    fn unsubscribe(&self, id: SubscriberId) {
        let stop = {
            let mut state = self.state.lock();
            let before = state.subscribers.len();
            state.subscribers.retain(|(sid, _)| *sid != id);
            if state.subscribers.len() < before && state.subscribers.is_empty() {
                state.stop.take()
            } else {
                None
            }
        };
        // Lock is released before the stop notifier runs.
        if let Some(stop) = stop {
            stop();
        }
    }

    fn snapshot(state: &State<T>) -> Vec<Arc<SubscriberFn<T>>> {
        state
            .subscribers
            .iter()
            .map(|(_, run)| Arc::clone(run))
            .collect()
    }

    fn notify(value: &T, subscribers: Vec<Arc<SubscriberFn<T>>>) {
        for run in subscribers {
            run(value);
        }
    }
}

/// A shared value holder that notifies subscribers on every write.
///
/// Cloning a `Writable` creates another handle to the **same** store.
///
/// # Lifecycle
///
/// A store built with [`Writable::with_start`] calls its start notifier when
/// the subscriber count goes from zero to one. The notifier receives a
/// [`Setter`] and returns a [`StopNotifier`], which is called when the count
/// returns to zero. The next zero-to-one transition starts it again.
///
/// # Reentrancy
///
/// The internal lock is never held while subscribers or notifiers run, so
/// they may subscribe, unsubscribe or write to any store. Notification uses
/// a snapshot of the subscriber list:
///   - A subscriber removed during notification is still called in that round.
///   - A subscriber added during notification is not called until the next write.
///
/// Writes always notify; there is no equality check. Writes made by the
/// start notifier itself update the value without notifying: the first
/// subscriber receives the resulting value once, after the notifier returns.
pub struct Writable<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Writable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Writable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Writable")
            .field("value", &state.value)
            .field("subscriber_count", &state.subscribers.len())
            .field("active", &state.stop.is_some())
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> Writable<T> {
    /// Create a store with no start notifier.
    pub fn new(value: T) -> Self {
        Self::build(value, None)
    }

    /// Create a store whose `start` runs on the first subscription.
    pub fn with_start<F>(value: T, start: F) -> Self
    where
        F: Fn(Setter<T>) -> StopNotifier + Send + Sync + 'static,
    {
        Self::build(value, Some(Box::new(start)))
    }

    fn build(value: T, start: Option<Box<StartFn<T>>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    value,
                    subscribers: Vec::new(),
                    stop: None,
                    starting: false,
                }),
                start,
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        self.inner.set(value);
    }

    /// Compute a new value from the current one and notify subscribers.
    ///
    /// `f` runs under the store lock and must not touch this store.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        self.inner.update(f);
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.inner.state.lock().value.clone()
    }

    /// Register `run`. It is called right away with the current value.
    pub fn subscribe<F>(&self, run: F) -> Unsubscriber
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.inner.subscribe(Arc::new(run))
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.state.lock().subscribers.len()
    }

    /// A handle that can subscribe and read but not write.
    pub fn read_only(&self) -> ReadableStore<T> {
        ReadableStore {
            store: self.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Readable<T> for Writable<T> {
    fn subscribe<F>(&self, run: F) -> Unsubscriber
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Writable::subscribe(self, run)
    }

    fn get(&self) -> T {
        Writable::get(self)
    }
}

/// Write access handed to a start notifier.
///
/// Holds the store weakly: writes after the store is dropped are ignored.
pub struct Setter<T> {
    inner: Weak<Inner<T>>,
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Setter<T> {
    /// Replace the store value and notify subscribers.
    pub fn set(&self, value: T) {
        if let Some(inner) = self.inner.upgrade() {
            inner.set(value);
        }
    }

    /// Compute a new value from the current one and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        if let Some(inner) = self.inner.upgrade() {
            inner.update(f);
        }
    }
}

/// Read-only view of a [`Writable`].
pub struct ReadableStore<T> {
    store: Writable<T>,
}

impl<T> Clone for ReadableStore<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ReadableStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadableStore").field(&self.store).finish()
    }
}

impl<T: Clone + Send + Sync + 'static> ReadableStore<T> {
    /// Register `run`. It is called right away with the current value.
    pub fn subscribe<F>(&self, run: F) -> Unsubscriber
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.store.subscribe(run)
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.store.get()
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.store.subscriber_count()
    }
}

impl<T: Clone + Send + Sync + 'static> Readable<T> for ReadableStore<T> {
    fn subscribe<F>(&self, run: F) -> Unsubscriber
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.store.subscribe(run)
    }

    fn get(&self) -> T {
        self.store.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn recorder<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |v: &T| sink.lock().push(v.clone()))
    }

    #[test]
    fn test_subscribe_receives_current_value() {
        let store = Writable::new(7);
        let (seen, run) = recorder();

        let _unsub = store.subscribe(run);

        assert_eq!(*seen.lock(), vec![7]);
    }

    #[test]
    fn test_set_notifies_in_order() {
        let store = Writable::new(0);
        let (seen, run) = recorder();
        let _unsub = store.subscribe(run);

        store.set(1);
        store.set(2);
        store.set(2);

        // Equal writes still notify
        assert_eq!(*seen.lock(), vec![0, 1, 2, 2]);
        assert_eq!(store.get(), 2);
    }

    #[test]
    fn test_update() {
        let store = Writable::new(10);
        store.update(|v| v + 5);
        assert_eq!(store.get(), 15);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let store = Writable::new(0);
        let (seen, run) = recorder();

        let unsub = store.subscribe(run);
        assert_eq!(store.subscriber_count(), 1);
        drop(unsub);
        assert_eq!(store.subscriber_count(), 0);

        store.set(1);
        assert_eq!(*seen.lock(), vec![0]);
    }

    #[test]
    fn test_start_stop_lifecycle() {
        let starts = Arc::new(AtomicUsize::new(0));
        let stops = Arc::new(AtomicUsize::new(0));

        let store = {
            let starts = Arc::clone(&starts);
            let stops = Arc::clone(&stops);
            Writable::with_start(0, move |_set| {
                starts.fetch_add(1, Ordering::SeqCst);
                let stops = Arc::clone(&stops);
                Box::new(move || {
                    stops.fetch_add(1, Ordering::SeqCst);
                })
            })
        };

        let a = store.subscribe(|_| {});
        let b = store.subscribe(|_| {});
        assert_eq!(starts.load(Ordering::SeqCst), 1);

        a.unsubscribe();
        assert_eq!(stops.load(Ordering::SeqCst), 0);
        b.unsubscribe();
        assert_eq!(stops.load(Ordering::SeqCst), 1);

        // Next subscription starts again
        let _c = store.subscribe(|_| {});
        assert_eq!(starts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_start_can_set_value() {
        let store = Writable::with_start(0, |set| {
            set.set(41);
            set.update(|v| v + 1);
            Box::new(|| {})
        });
        let (seen, run) = recorder();

        let _unsub = store.subscribe(run);

        assert_eq!(store.get(), 42);
        // Writes inside the start notifier are folded into one notification
        assert_eq!(*seen.lock(), vec![42]);
    }

    #[test]
    fn test_writes_notify_after_start_returns() {
        let setter = Arc::new(Mutex::new(None));
        let store = {
            let setter = Arc::clone(&setter);
            Writable::with_start(0, move |set| {
                set.set(1);
                *setter.lock() = Some(set);
                Box::new(|| {})
            })
        };
        let (seen, run) = recorder();
        let _unsub = store.subscribe(run);

        let set = setter.lock().take().unwrap();
        set.set(2);

        assert_eq!(*seen.lock(), vec![1, 2]);
    }

    #[test]
    fn test_setter_after_drop_is_ignored() {
        let setter = Arc::new(Mutex::new(None));
        let store = {
            let setter = Arc::clone(&setter);
            Writable::with_start(0, move |set| {
                *setter.lock() = Some(set);
                Box::new(|| {})
            })
        };
        let unsub = store.subscribe(|_| {});
        unsub.unsubscribe();
        drop(store);

        let set = setter.lock().take().unwrap();
        set.set(5);
    }

    #[test]
    fn test_reentrant_unsubscribe_during_notify() {
        let store = Writable::new(0);
        let slot: Arc<Mutex<Option<Unsubscriber>>> = Arc::new(Mutex::new(None));
        let calls = Arc::new(AtomicUsize::new(0));

        let unsub = {
            let slot = Arc::clone(&slot);
            let calls = Arc::clone(&calls);
            store.subscribe(move |v| {
                calls.fetch_add(1, Ordering::SeqCst);
                if *v == 1 {
                    if let Some(unsub) = slot.lock().take() {
                        unsub.unsubscribe();
                    }
                }
            })
        };
        *slot.lock() = Some(unsub);

        store.set(1);
        store.set(2);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_read_only_shares_state() {
        let store = Writable::new("a".to_string());
        let view = store.read_only();

        store.set("b".to_string());

        assert_eq!(view.get(), "b");
    }
}
