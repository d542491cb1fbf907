//! Error type for the room system surface

use thiserror::Error;

/// Errors surfaced to UI and domain-controller callers
///
/// Addressing problems (unknown device, unsupported command) fail loudly;
/// transport trouble never reaches here - it is logged at the facade
/// boundary and the status stores keep their last known values.
#[derive(Error, Debug)]
pub enum RoomError {
    /// No device registered under this id
    #[error("no device registered with id {0}")]
    DeviceNotFound(String),

    /// Addressing error from a device facade
    #[error(transparent)]
    Device(#[from] roomctl_device::DeviceError),

    /// Registration error from the polling scheduler
    #[error(transparent)]
    Scheduler(#[from] roomctl_scheduler::SchedulerError),
}

/// Result type for room system operations
pub type Result<T> = std::result::Result<T, RoomError>;
