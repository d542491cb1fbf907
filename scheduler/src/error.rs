//! Error types for the polling scheduler

use thiserror::Error;

/// Errors surfaced by scheduler registration calls
///
/// Tick-time failures (queue full, transport trouble) are logged, never
/// returned: a missed poll is retried by the cadence itself.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// Auto-subscription failed while adding an entry
    #[error(transparent)]
    Device(#[from] roomctl_device::DeviceError),

    /// The poll worker pool has shut down
    #[error("poll worker pool has shut down")]
    WorkerPoolDown,
}

/// Result type for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;
