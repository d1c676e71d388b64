//! # Reactive Bridge
//!
//! Adapters between two reactive models: push-based streams and
//! subscribe/notify state stores.
//!
//! ## Core Concepts
//!
//! - **Stores**: Single-value holders that call subscribers on every write,
//!   with a start/stop lifecycle tied to the subscriber count
//! - **Streams**: Cold observables and hot subjects delivering `next` values
//!   and a terminal `error` or `complete`
//! - **Scheduler**: A FIFO deferred-task queue; one drain is one tick
//! - **Bridge**: `store_to_observable` and `observable_to_store`
//!
//! ## Example
//!
//! ```ignore
//! use reactive_bridge::{observable_to_store, Subject, TaskQueue};
//! use std::sync::Arc;
//!
//! let queue = Arc::new(TaskQueue::new());
//! let subject = Subject::<u32, String>::new();
//! let stores = observable_to_store(&subject.observable(), queue.clone());
//!
//! let unsub = stores.value.subscribe(|v| println!("value: {:?}", v));
//! subject.next(1);
//! assert_eq!(stores.value.get(), Some(1));
//!
//! unsub.unsubscribe();
//! queue.run_pending();
//! assert_eq!(subject.observer_count(), 0);
//! ```

pub mod bridge;
pub mod error;
pub mod scheduler;
pub mod store;
pub mod stream;

// Re-exports
pub use bridge::{
    observable_to_store, observable_to_store_with, store_to_observable, BridgeConfig,
    ObservableStores, ReleasePolicy,
};
pub use error::{BridgeError, Result};
pub use scheduler::{Scheduler, Task, TaskQueue};
pub use store::{Readable, ReadableStore, Setter, StopNotifier, Unsubscriber, Writable};
pub use stream::{
    FnObserver, Notification, Observable, Observer, Subject, Subscriber, Subscription, Teardown,
};
