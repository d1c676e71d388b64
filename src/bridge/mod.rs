//! Adapters between observables and stores.
//!
//! - [`store_to_observable`]: each stream subscription follows a store
//! - [`observable_to_store`]: a stream drives a value store and an error
//!   store, subscribed only while the value store is observed
//!
//! # Example
//!
//! ```ignore
//! let queue = Arc::new(TaskQueue::new());
//! let subject = Subject::<String, String>::new();
//! let stores = observable_to_store(&subject.observable(), queue.clone());
//!
//! let unsub = stores.value.subscribe(|v| println!("{:?}", v));
//! subject.next("ready".to_string());
//!
//! unsub.unsubscribe();
//! queue.run_pending(); // source subscription released here
//! ```

mod config;
mod to_observable;
mod to_store;

pub use config::{BridgeConfig, ReleasePolicy};
pub use to_observable::store_to_observable;
pub use to_store::{observable_to_store, observable_to_store_with, ObservableStores};
