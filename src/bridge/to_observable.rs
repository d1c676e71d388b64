//! Store to observable adapter.

use tracing::trace;

use crate::store::Readable;
use crate::stream::{Observable, Subscriber, Teardown};

/// Expose a store as an observable.
///
/// Each subscription to the returned observable registers its own store
/// subscriber and forwards every store notification as `next`, starting
/// with the current value. Unsubscribing removes the store subscriber.
///
/// Stores cannot fail, so the observable never emits `error` or `complete`;
/// `E` is free for the caller to pick.
pub fn store_to_observable<T, E, S>(store: &S) -> Observable<T, E>
where
    S: Readable<T> + Clone + 'static,
    T: Clone + Send + 'static,
    E: Send + 'static,
{
    let store = store.clone();
    Observable::new(move |subscriber: Subscriber<T, E>| {
        let unsubscriber = store.subscribe(move |value: &T| {
            trace!("store value");
            subscriber.next(value.clone());
        });
        Teardown::from(unsubscriber)
    })
}
