//! Observer types for push streams.

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

/// Receiver of stream notifications.
///
/// `error` and `complete` are terminal: after either, nothing else is
/// delivered on the same subscription.
pub trait Observer<T, E>: Send + Sync {
    /// A new value was emitted.
    fn next(&self, value: T);

    /// The stream failed.
    fn error(&self, err: E);

    /// The stream finished.
    fn complete(&self) {}
}

/// A single stream notification, as recorded by channel observers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Notification<T, E> {
    Next(T),
    Error(E),
    Complete,
}

impl<T, E> Notification<T, E> {
    /// True for `Error` and `Complete`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Notification::Next(_))
    }

    /// Deliver this notification to `observer`.
    pub fn deliver<O: Observer<T, E> + ?Sized>(self, observer: &O) {
        match self {
            Notification::Next(value) => observer.next(value),
            Notification::Error(err) => observer.error(err),
            Notification::Complete => observer.complete(),
        }
    }
}

/// Closure-based observer.
pub struct FnObserver<T, E> {
    next: Box<dyn Fn(T) + Send + Sync>,
    error: Box<dyn Fn(E) + Send + Sync>,
    complete: Option<Box<dyn Fn() + Send + Sync>>,
}

impl<T, E> FnObserver<T, E> {
    pub fn new<N, R>(next: N, error: R) -> Self
    where
        N: Fn(T) + Send + Sync + 'static,
        R: Fn(E) + Send + Sync + 'static,
    {
        Self {
            next: Box::new(next),
            error: Box::new(error),
            complete: None,
        }
    }

    /// Also run `complete` when the stream finishes.
    pub fn on_complete(mut self, complete: impl Fn() + Send + Sync + 'static) -> Self {
        self.complete = Some(Box::new(complete));
        self
    }
}

impl<T, E> Observer<T, E> for FnObserver<T, E> {
    fn next(&self, value: T) {
        (self.next)(value);
    }

    fn error(&self, err: E) {
        (self.error)(err);
    }

    fn complete(&self) {
        if let Some(ref complete) = self.complete {
            complete();
        }
    }
}

/// Channel observers forward every notification. A disconnected receiver
/// is ignored.
impl<T: Send, E: Send> Observer<T, E> for Sender<Notification<T, E>> {
    fn next(&self, value: T) {
        let _ = self.send(Notification::Next(value));
    }

    fn error(&self, err: E) {
        let _ = self.send(Notification::Error(err));
    }

    fn complete(&self) {
        let _ = self.send(Notification::Complete);
    }
}
