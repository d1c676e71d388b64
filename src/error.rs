//! Error types for the bridge.

use thiserror::Error;

/// Main error type for bridge operations.
///
/// Stream errors are not represented here: they are values of the stream's
/// own error type and travel through the `error` store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Scheduler is closed")]
    SchedulerClosed,

    #[error("Task queue disconnected")]
    QueueDisconnected,
}

impl<T> From<crossbeam_channel::SendError<T>> for BridgeError {
    fn from(_: crossbeam_channel::SendError<T>) -> Self {
        BridgeError::QueueDisconnected
    }
}

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
