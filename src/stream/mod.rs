//! Push-based streams.
//!
//! This module provides a small observable toolkit:
//! - [`Observable`]: cold streams built from a producer function
//! - [`Subject`]: hot multicast streams fed by hand
//! - [`Subscription`]: shared, idempotent release handle
//!
//! A stream delivers any number of `next` notifications followed by at most
//! one terminal `error` or `complete`. A terminal notification closes the
//! subscription and runs its teardown.
//!
//! # Example
//!
//! ```ignore
//! let subject = Subject::<u32, String>::new();
//! let (subscription, rx) = subject.observable().subscribe_channel();
//!
//! subject.next(1);
//! assert_eq!(rx.recv()?, Notification::Next(1));
//!
//! subscription.unsubscribe();
//! ```

mod observable;
mod observer;
mod subject;
mod subscription;

pub use observable::{Observable, Subscriber};
pub use observer::{FnObserver, Notification, Observer};
pub use subject::Subject;
pub use subscription::{Subscription, Teardown};
