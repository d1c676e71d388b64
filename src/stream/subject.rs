//! Multicast subject: an observable that is fed by hand.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::trace;

use super::observable::{Observable, Subscriber};
use super::subscription::Teardown;

/// How a subject ended.
#[derive(Clone, Debug)]
enum Terminal<E> {
    Error(E),
    Complete,
}

struct SubjectState<T, E> {
    observers: Vec<(u64, Subscriber<T, E>)>,
    terminal: Option<Terminal<E>>,
}

struct SubjectInner<T, E> {
    state: Mutex<SubjectState<T, E>>,
    next_id: AtomicU64,
}

impl<T, E> SubjectInner<T, E> {
    fn remove(&self, id: u64) {
        self.state.lock().observers.retain(|(oid, _)| *oid != id);
    }
}

/// A hot, multicast stream source.
///
/// Values pushed with [`Subject::next`] reach every observer attached at that
/// moment. After [`Subject::error`] or [`Subject::complete`] all observers are
/// dropped, and late subscribers receive the terminal notification right away.
///
/// Emission snapshots the observer list and calls observers without holding
/// the lock, so observers may attach or detach from inside a callback.
pub struct Subject<T, E> {
    inner: Arc<SubjectInner<T, E>>,
}

impl<T, E> Clone for Subject<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> fmt::Debug for Subject<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Subject")
            .field("observers", &state.observers.len())
            .field("stopped", &state.terminal.is_some())
            .finish()
    }
}

impl<T, E> Default for Subject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Subject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SubjectInner {
                state: Mutex::new(SubjectState {
                    observers: Vec::new(),
                    terminal: None,
                }),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Push `value` to every attached observer. Ignored once stopped.
    pub fn next(&self, value: T) {
        let snapshot: Vec<Subscriber<T, E>> = {
            let state = self.inner.state.lock();
            if state.terminal.is_some() {
                return;
            }
            state.observers.iter().map(|(_, s)| s.clone()).collect()
        };
        trace!(observers = snapshot.len(), "subject next");
        for subscriber in snapshot {
            subscriber.next(value.clone());
        }
    }

    /// Fail every attached observer and stop the subject.
    pub fn error(&self, err: E) {
        let Some(observers) = self.finish(Terminal::Error(err.clone())) else {
            return;
        };
        for (_, subscriber) in observers {
            subscriber.error(err.clone());
        }
    }

    /// Complete every attached observer and stop the subject.
    pub fn complete(&self) {
        let Some(observers) = self.finish(Terminal::Complete) else {
            return;
        };
        for (_, subscriber) in observers {
            subscriber.complete();
        }
    }

    fn finish(&self, terminal: Terminal<E>) -> Option<Vec<(u64, Subscriber<T, E>)>> {
        let mut state = self.inner.state.lock();
        if state.terminal.is_some() {
            return None;
        }
        state.terminal = Some(terminal);
        Some(std::mem::take(&mut state.observers))
    }

    /// Number of attached observers.
    pub fn observer_count(&self) -> usize {
        self.inner.state.lock().observers.len()
    }

    /// Whether the subject has errored or completed.
    pub fn is_stopped(&self) -> bool {
        self.inner.state.lock().terminal.is_some()
    }

    /// An observable that attaches to this subject.
    pub fn observable(&self) -> Observable<T, E> {
        let inner: Weak<SubjectInner<T, E>> = Arc::downgrade(&self.inner);
        Observable::new(move |subscriber: Subscriber<T, E>| {
            let Some(inner) = inner.upgrade() else {
                subscriber.complete();
                return Teardown::empty();
            };

            let mut state = inner.state.lock();
            let terminal = state.terminal.clone();
            if let Some(terminal) = terminal {
                drop(state);
                match terminal {
                    Terminal::Error(err) => subscriber.error(err),
                    Terminal::Complete => subscriber.complete(),
                }
                return Teardown::empty();
            }

            let id = inner.next_id.fetch_add(1, Ordering::Relaxed);
            state.observers.push((id, subscriber));
            drop(state);

            let inner = Arc::downgrade(&inner);
            Teardown::new(move || {
                if let Some(inner) = inner.upgrade() {
                    inner.remove(id);
                }
            })
        })
    }
}
