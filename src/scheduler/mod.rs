//! Deferred task scheduling.
//!
//! The bridge defers subscription release by one tick so that a store torn
//! down and immediately rebuilt keeps its upstream attachment. The host
//! decides what a tick is by implementing [`Scheduler`]; [`TaskQueue`] is a
//! manually drained FIFO for event loops and tests.

mod queue;

pub use queue::TaskQueue;

use crate::error::Result;
use std::sync::Arc;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send>;

/// Runs tasks after the current synchronous work, in FIFO order.
pub trait Scheduler: Send + Sync {
    /// Queue `task`. Fails if the scheduler no longer accepts work.
    fn schedule(&self, task: Task) -> Result<()>;
}

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
    fn schedule(&self, task: Task) -> Result<()> {
        (**self).schedule(task)
    }
}
