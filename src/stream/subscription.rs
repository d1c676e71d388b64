//! Subscription handles and teardown logic.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::store::Unsubscriber;

/// Cleanup run when a subscription closes.
#[must_use]
#[derive(Default)]
pub struct Teardown(Option<Box<dyn FnOnce() + Send>>);

impl Teardown {
    pub fn new(f: impl FnOnce() + Send + 'static) -> Self {
        Self(Some(Box::new(f)))
    }

    /// A teardown that does nothing.
    pub fn empty() -> Self {
        Self(None)
    }

    pub(crate) fn run(mut self) {
        if let Some(f) = self.0.take() {
            f();
        }
    }
}

impl From<Unsubscriber> for Teardown {
    fn from(unsubscriber: Unsubscriber) -> Self {
        Teardown::new(move || unsubscriber.unsubscribe())
    }
}

impl From<Subscription> for Teardown {
    fn from(subscription: Subscription) -> Self {
        Teardown::new(move || subscription.unsubscribe())
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Teardown").field(&self.0.is_some()).finish()
    }
}

struct SubscriptionInner {
    /// No further notifications are delivered.
    stopped: AtomicBool,
    /// Teardown has run (or is running).
    closed: AtomicBool,
    teardowns: Mutex<Vec<Teardown>>,
}

/// Handle to an attachment on a stream.
///
/// Clones share the same attachment. `unsubscribe` is idempotent and runs
/// every registered teardown exactly once. Dropping a handle does **not**
/// unsubscribe.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<SubscriptionInner>,
}

impl Subscription {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(SubscriptionInner {
                stopped: AtomicBool::new(false),
                closed: AtomicBool::new(false),
                teardowns: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Whether the subscription has been released.
    pub fn closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Release the subscription and run its teardowns.
    pub fn unsubscribe(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.stopped.store(true, Ordering::SeqCst);
        let teardowns = std::mem::take(&mut *self.inner.teardowns.lock());
        for teardown in teardowns {
            teardown.run();
        }
    }

    /// Register additional cleanup. Runs immediately if already closed.
    pub fn add(&self, teardown: impl Into<Teardown>) {
        let teardown = teardown.into();
        {
            let mut teardowns = self.inner.teardowns.lock();
            if !self.closed() {
                teardowns.push(teardown);
                return;
            }
        }
        teardown.run();
    }

    /// Whether notifications are still being delivered.
    pub(crate) fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    /// Mark as stopped. Returns false if it already was.
    pub(crate) fn stop(&self) -> bool {
        !self.inner.stopped.swap(true, Ordering::SeqCst)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.closed())
            .field("teardowns", &self.inner.teardowns.lock().len())
            .finish()
    }
}
