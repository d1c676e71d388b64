//! Cold observables built from producer functions.

use crossbeam_channel::{unbounded, Receiver};
use std::fmt;
use std::sync::Arc;

use super::observer::{FnObserver, Notification, Observer};
use super::subscription::{Subscription, Teardown};

type Producer<T, E> = dyn Fn(Subscriber<T, E>) -> Teardown + Send + Sync;

/// The producer's side of one subscription.
///
/// Forwards notifications to the observer until the subscription stops.
/// A terminal notification stops the subscription and then releases it,
/// which runs the producer's teardown.
pub struct Subscriber<T, E> {
    observer: Arc<dyn Observer<T, E>>,
    subscription: Subscription,
}

impl<T, E> Clone for Subscriber<T, E> {
    fn clone(&self) -> Self {
        Self {
            observer: Arc::clone(&self.observer),
            subscription: self.subscription.clone(),
        }
    }
}

impl<T, E> Subscriber<T, E> {
    pub fn next(&self, value: T) {
        if self.subscription.is_stopped() {
            return;
        }
        self.observer.next(value);
    }

    pub fn error(&self, err: E) {
        if !self.subscription.stop() {
            return;
        }
        self.observer.error(err);
        self.subscription.unsubscribe();
    }

    pub fn complete(&self) {
        if !self.subscription.stop() {
            return;
        }
        self.observer.complete();
        self.subscription.unsubscribe();
    }

    /// Whether the observer still accepts notifications.
    pub fn is_closed(&self) -> bool {
        self.subscription.is_stopped()
    }

    /// The subscription this subscriber feeds.
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }
}

impl<T, E> Observer<T, E> for Subscriber<T, E> {
    fn next(&self, value: T) {
        Subscriber::next(self, value);
    }

    fn error(&self, err: E) {
        Subscriber::error(self, err);
    }

    fn complete(&self) {
        Subscriber::complete(self);
    }
}

/// A push-based stream of `T` values that may fail with `E`.
///
/// Observables are cold: each call to [`Observable::subscribe`] runs the
/// producer again with a fresh [`Subscriber`]. Cloning shares the producer.
///
/// # Example
///
/// ```ignore
/// let numbers = Observable::<u32, String>::new(|subscriber| {
///     subscriber.next(1);
///     subscriber.next(2);
///     subscriber.complete();
///     Teardown::empty()
/// });
/// let subscription = numbers.subscribe_fn(|v| println!("{}", v), |e| eprintln!("{}", e));
/// ```
pub struct Observable<T, E> {
    producer: Arc<Producer<T, E>>,
}

impl<T, E> Clone for Observable<T, E> {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
        }
    }
}

impl<T, E> fmt::Debug for Observable<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}

impl<T: Send + 'static, E: Send + 'static> Observable<T, E> {
    /// Create an observable from a producer.
    ///
    /// The producer runs once per subscription and returns the teardown to
    /// run when that subscription closes.
    pub fn new<F>(producer: F) -> Self
    where
        F: Fn(Subscriber<T, E>) -> Teardown + Send + Sync + 'static,
    {
        Self {
            producer: Arc::new(producer),
        }
    }

    /// Emit every item in order, then complete.
    pub fn from_iter<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Clone + Sync,
    {
        let items: Vec<T> = items.into_iter().collect();
        Self::new(move |subscriber| {
            for item in &items {
                if subscriber.is_closed() {
                    break;
                }
                subscriber.next(item.clone());
            }
            subscriber.complete();
            Teardown::empty()
        })
    }

    /// Fail immediately with `err`.
    pub fn fail(err: E) -> Self
    where
        E: Clone + Sync,
    {
        Self::new(move |subscriber| {
            subscriber.error(err.clone());
            Teardown::empty()
        })
    }

    /// Attach `observer` and return the subscription handle.
    ///
    /// A source that fails or completes synchronously returns an already
    /// closed subscription.
    pub fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: Observer<T, E> + 'static,
    {
        let subscription = Subscription::new();
        let subscriber = Subscriber {
            observer: Arc::new(observer),
            subscription: subscription.clone(),
        };
        let teardown = (self.producer)(subscriber);
        subscription.add(teardown);
        subscription
    }

    /// Attach closures for values and errors.
    pub fn subscribe_fn<N, R>(&self, next: N, error: R) -> Subscription
    where
        N: Fn(T) + Send + Sync + 'static,
        R: Fn(E) + Send + Sync + 'static,
    {
        self.subscribe(FnObserver::new(next, error))
    }

    /// Attach a channel and return its receiving end.
    ///
    /// Every notification is buffered; the receiver sees a terminal
    /// notification last.
    pub fn subscribe_channel(&self) -> (Subscription, Receiver<Notification<T, E>>) {
        let (sender, receiver) = unbounded();
        (self.subscribe(sender), receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[test]
    fn test_from_iter_emits_then_completes() {
        let source = Observable::<u32, String>::from_iter(vec![1, 2, 3]);
        let (subscription, rx) = source.subscribe_channel();

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                Notification::Next(1),
                Notification::Next(2),
                Notification::Next(3),
                Notification::Complete,
            ]
        );
        assert!(subscription.closed());
    }

    #[test]
    fn test_fail_closes_subscription() {
        let source = Observable::<u32, String>::fail("nope".to_string());
        let (subscription, rx) = source.subscribe_channel();

        assert_eq!(rx.try_recv().unwrap(), Notification::Error("nope".to_string()));
        assert!(subscription.closed());
    }

    #[test]
    fn test_cold_producer_runs_per_subscription() {
        let runs = Arc::new(AtomicUsize::new(0));
        let source = {
            let runs = Arc::clone(&runs);
            Observable::<u32, String>::new(move |_subscriber| {
                runs.fetch_add(1, Ordering::SeqCst);
                Teardown::empty()
            })
        };

        let _a = source.subscribe_fn(|_| {}, |_| {});
        let _b = source.clone().subscribe_fn(|_| {}, |_| {});

        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_runs_producer_teardown() {
        let torn_down = Arc::new(AtomicBool::new(false));
        let source = {
            let torn_down = Arc::clone(&torn_down);
            Observable::<u32, String>::new(move |_subscriber| {
                let torn_down = Arc::clone(&torn_down);
                Teardown::new(move || torn_down.store(true, Ordering::SeqCst))
            })
        };

        let subscription = source.subscribe_fn(|_| {}, |_| {});
        assert!(!torn_down.load(Ordering::SeqCst));

        subscription.unsubscribe();
        assert!(torn_down.load(Ordering::SeqCst));
    }

    #[test]
    fn test_nothing_delivered_after_error() {
        let source = Observable::<u32, String>::new(|subscriber| {
            subscriber.next(1);
            subscriber.error("first".to_string());
            subscriber.next(2);
            subscriber.error("second".to_string());
            subscriber.complete();
            Teardown::empty()
        });

        let (_subscription, rx) = source.subscribe_channel();
        let events: Vec<_> = rx.try_iter().collect();

        assert_eq!(
            events,
            vec![Notification::Next(1), Notification::Error("first".to_string())]
        );
    }
}
