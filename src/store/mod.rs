//! Subscribable state stores.
//!
//! A store holds a single value and calls its subscribers with the current
//! value on registration and again on every write. Stores can carry a start
//! notifier so that work happens only while someone is listening:
//! - The notifier runs when the first subscriber arrives
//! - The stop callback it returns runs when the last subscriber leaves
//!
//! # Example
//!
//! ```ignore
//! let store = Writable::new(0);
//! let unsub = store.subscribe(|v| println!("now {}", v));
//! store.set(1);
//! unsub.unsubscribe();
//! ```

mod types;
mod writable;

pub use types::{Readable, StopNotifier, SubscriberFn, SubscriberId, Unsubscriber};
pub use writable::{ReadableStore, Setter, Writable};
