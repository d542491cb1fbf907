//! Error types for the device facade

use thiserror::Error;

/// Addressing errors surfaced by the facade
///
/// These are programmer errors (misconfiguration), always returned to the
/// caller. Transport failures never appear here: they are caught at the
/// handler boundary, logged, and treated as "no new information".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The command has no handler / definition on this device
    #[error("device {device} does not support command {command}")]
    UnsupportedCommand { device: String, command: String },

    /// A handler was registered for a command the device never defined
    #[error("device {device} registered a handler for undefined command {command}")]
    UndefinedCommand { device: String, command: String },
}

/// Result type for device facade operations
pub type Result<T> = std::result::Result<T, DeviceError>;

/// A failure inside a device-specific set/update handler
///
/// Covers timeouts, malformed responses, and protocol-level rejections.
/// Handlers return this; the facade logs it with device/command context and
/// keeps the last known status. Retries, if any, are the polling cadence
/// itself.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    /// Describe a transport failure
    pub fn new<M: Into<String>>(message: M) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for TransportError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for TransportError {
    fn from(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

// Lets handlers propagate `write_status` addressing failures with `?`.
impl From<DeviceError> for TransportError {
    fn from(err: DeviceError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}
