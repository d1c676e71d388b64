//! Observable to store adapter.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::config::{BridgeConfig, ReleasePolicy};
use crate::scheduler::Scheduler;
use crate::store::{ReadableStore, Setter, StopNotifier, Writable};
use crate::stream::{Observable, Observer, Subscription};

/// The pair of stores produced by [`observable_to_store`].
///
/// `None` is the unset state of either store.
pub struct ObservableStores<T, E> {
    /// Latest value, or `None` before the first one and after an error.
    pub value: ReadableStore<Option<T>>,
    /// Latest error, or `None` once a value arrives.
    pub error: ReadableStore<Option<E>>,
}

impl<T, E> ObservableStores<T, E> {
    pub fn into_parts(self) -> (ReadableStore<Option<T>>, ReadableStore<Option<E>>) {
        (self.value, self.error)
    }
}

impl<T, E> Clone for ObservableStores<T, E> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            error: self.error.clone(),
        }
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for ObservableStores<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableStores")
            .field("value", &self.value)
            .field("error", &self.error)
            .finish()
    }
}

/// Turn an observable into a pair of value/error stores.
///
/// The source is subscribed when `value` gets its first subscriber and
/// released one scheduler tick after `value` loses its last one. Subscribing
/// again before that tick keeps the existing source subscription. Subscribers
/// of `error` alone never subscribe the source.
///
/// On `next(v)` the error store is cleared and then `value` is set. On
/// `error(e)` the value store is cleared and then `error` is set; the source
/// is not resubscribed until `value` is next activated.
pub fn observable_to_store<T, E>(
    source: &Observable<T, E>,
    scheduler: Arc<dyn Scheduler>,
) -> ObservableStores<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    observable_to_store_with(source, scheduler, BridgeConfig::default())
}

/// [`observable_to_store`] with explicit configuration.
pub fn observable_to_store_with<T, E>(
    source: &Observable<T, E>,
    scheduler: Arc<dyn Scheduler>,
    config: BridgeConfig,
) -> ObservableStores<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    let error = Writable::new(None);
    let connection = Arc::new(Connection {
        source: source.clone(),
        scheduler,
        config,
        error: error.clone(),
        state: Mutex::new(ConnectionState::default()),
    });
    let value = Writable::with_start(None, move |set| connection.activate(set));

    ObservableStores {
        value: value.read_only(),
        error: error.read_only(),
    }
}

#[derive(Default)]
struct ConnectionState {
    /// At most one source subscription per connection.
    subscription: Option<Subscription>,
    /// Bumped on every activation and deactivation. A release only proceeds
    /// if no activation happened since it was scheduled.
    generation: u64,
}

/// Owns the source subscription behind one pair of stores.
struct Connection<T, E> {
    source: Observable<T, E>,
    scheduler: Arc<dyn Scheduler>,
    config: BridgeConfig,
    error: Writable<Option<E>>,
    state: Mutex<ConnectionState>,
}

impl<T, E> Connection<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Start notifier of the value store.
    fn activate(self: &Arc<Self>, value: Setter<Option<T>>) -> StopNotifier {
        let reuse = {
            let mut state = self.state.lock();
            state.generation += 1;
            match &state.subscription {
                Some(subscription) if !subscription.closed() => {
                    debug!(generation = state.generation, "reusing source subscription");
                    true
                }
                _ => false,
            }
        };

        if !reuse {
            debug!("subscribing to source");
            // Lock is released: the source may emit synchronously.
            let subscription = self.source.subscribe(StoreSink {
                value: value.clone(),
                error: self.error.clone(),
            });
            self.state.lock().subscription = Some(subscription);
        }

        let connection = Arc::clone(self);
        Box::new(move || connection.deactivate(value))
    }

    /// Stop notifier of the value store.
    fn deactivate(self: &Arc<Self>, value: Setter<Option<T>>) {
        let generation = {
            let mut state = self.state.lock();
            state.generation += 1;
            state.generation
        };

        match self.config.release {
            ReleasePolicy::Immediate => self.release(generation, &value),
            ReleasePolicy::Deferred => {
                let connection = Arc::clone(self);
                let deferred_value = value.clone();
                let task = Box::new(move || connection.release(generation, &deferred_value));
                if let Err(err) = self.scheduler.schedule(task) {
                    warn!(%err, "cannot defer source release, releasing now");
                    self.release(generation, &value);
                }
            }
        }
    }

    fn release(&self, generation: u64, value: &Setter<Option<T>>) {
        let subscription = {
            let mut state = self.state.lock();
            if state.generation != generation {
                debug!(
                    generation,
                    current = state.generation,
                    "store reactivated, keeping source subscription"
                );
                return;
            }
            state.subscription.take()
        };

        if let Some(subscription) = subscription {
            if !subscription.closed() {
                debug!("releasing source subscription");
                subscription.unsubscribe();
            }
        }

        if self.config.reset_on_release {
            self.error.set(None);
            value.set(None);
        }
    }
}

impl<T, E> Drop for Connection<T, E> {
    fn drop(&mut self) {
        if let Some(subscription) = self.state.get_mut().subscription.take() {
            subscription.unsubscribe();
        }
    }
}

/// Observer that writes source notifications into the two stores.
struct StoreSink<T, E> {
    value: Setter<Option<T>>,
    error: Writable<Option<E>>,
}

impl<T, E> Observer<T, E> for StoreSink<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn next(&self, value: T) {
        trace!("source value");
        self.error.set(None);
        self.value.set(Some(value));
    }

    fn error(&self, err: E) {
        trace!("source error");
        self.value.set(None);
        self.error.set(Some(err));
    }

    fn complete(&self) {
        debug!("source completed");
    }
}
