//! Store types shared by writable and read-only stores.

use std::fmt;

/// Unique identifier for a store subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

/// Closure type for store subscribers.
pub type SubscriberFn<T> = dyn Fn(&T) + Send + Sync;

/// Deactivation callback returned by a store's start notifier.
///
/// Runs once, when the last subscriber leaves.
pub type StopNotifier = Box<dyn FnOnce() + Send>;

/// A value holder that can be subscribed to.
///
/// Subscribers are called immediately with the current value and then on
/// every change until the returned [`Unsubscriber`] is consumed or dropped.
pub trait Readable<T>: Send + Sync {
    /// Register `run` and return its guard.
    fn subscribe<F>(&self, run: F) -> Unsubscriber
    where
        F: Fn(&T) + Send + Sync + 'static;

    /// Get a clone of the current value.
    fn get(&self) -> T;
}

/// Guard for a store subscription.
///
/// Dropping the guard unsubscribes. Use [`Unsubscriber::unsubscribe`] to make
/// the intent explicit.
#[must_use = "dropping an Unsubscriber unsubscribes immediately"]
pub struct Unsubscriber {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Unsubscriber {
    pub(crate) fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Remove the subscriber from its store.
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Unsubscriber {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for Unsubscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscriber")
            .field("active", &self.detach.is_some())
            .finish()
    }
}
