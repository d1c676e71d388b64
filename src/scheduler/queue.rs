//! FIFO task queue drained one tick at a time.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{Scheduler, Task};
use crate::error::{BridgeError, Result};

/// A deferred-task queue driven by its owner.
///
/// The host calls [`TaskQueue::run_pending`] once per turn of its event
/// loop. Each call is one tick: it runs, in FIFO order, the tasks that were
/// queued before the call. Tasks scheduled while the tick runs wait for the
/// next one.
pub struct TaskQueue {
    sender: Sender<Task>,
    receiver: Receiver<Task>,
    closed: AtomicBool,
}

impl TaskQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            closed: AtomicBool::new(false),
        }
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Run one tick. Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        let due = self.receiver.len();
        let mut ran = 0;
        while ran < due {
            match self.receiver.try_recv() {
                Ok(task) => {
                    task();
                    ran += 1;
                }
                Err(_) => break,
            }
        }
        ran
    }

    /// Run ticks until the queue is empty. Returns the number of tasks run.
    ///
    /// Does not return while tasks keep rescheduling themselves.
    pub fn run_until_idle(&self) -> usize {
        let mut total = 0;
        loop {
            let ran = self.run_pending();
            if ran == 0 {
                return total;
            }
            total += ran;
        }
    }

    /// Refuse new tasks. Already queued tasks can still be run.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.pending())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Scheduler for TaskQueue {
    fn schedule(&self, task: Task) -> Result<()> {
        if self.is_closed() {
            return Err(BridgeError::SchedulerClosed);
        }
        self.sender.send(task)?;
        Ok(())
    }
}
