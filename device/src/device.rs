//! The device facade
//!
//! One `Device` per physical or virtual unit of hardware. The facade hides
//! the wire protocol behind four verbs: `set` sends a command, `update`
//! polls one, `read_status` reads the cached value, `subscribe_status`
//! registers a change callback. Device-specific transport code plugs in as
//! set/update handlers and reports learned state back through
//! `write_status`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use status_store::{
    Qualifier, StatusCallback, StatusStore, StatusValue, Subscribe, UnknownCommand, Write,
};

use crate::connection::{ConnectionStatus, Health, LivenessTracker};
use crate::error::{DeviceError, Result, TransportError};

/// Transport handler for one settable command
///
/// Performs the wire call and, once the new state is confirmed or assumed,
/// reports it via [`Device::write_status`].
pub type SetHandler =
    Box<dyn Fn(&Device, &StatusValue, &Qualifier) -> std::result::Result<(), TransportError> + Send + Sync>;

/// Transport handler for one pollable command
///
/// Performs a read of the transport and reports the result via
/// [`Device::write_status`]. A command without an update handler is
/// feedback-only: its state arrives solely through asynchronous pushes.
pub type UpdateHandler =
    Box<dyn Fn(&Device, &Qualifier) -> std::result::Result<(), TransportError> + Send + Sync>;

/// Outcome of a `write_status` call, visible to transport code
///
/// `PartialQualifier` is deliberately not an error: heterogeneous callers
/// reuse one qualifier across devices where not every key is relevant. It is
/// logged at `debug` so misconfiguration stays discoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The cell changed; the matching subscription (if any) was notified
    Changed,
    /// The cell already held this value
    Unchanged,
    /// The qualifier omitted a declared parameter; nothing was written
    PartialQualifier,
}

pub(crate) struct Handlers {
    pub(crate) set: HashMap<String, SetHandler>,
    pub(crate) update: HashMap<String, UpdateHandler>,
}

struct DeviceState {
    store: StatusStore,
    liveness: LivenessTracker,
}

/// Facade over one hardware device
///
/// Identity is immutable after construction. Live state sits behind the
/// state lock; a second notify lock, taken before it and held across
/// notification dispatch, keeps per-device notification order identical to
/// write order. Handlers and callbacks run with the state lock released, so
/// they may read or subscribe freely. The one thing a callback must not do
/// is write status back to the same device synchronously.
///
/// Built via [`crate::DeviceBuilder`].
pub struct Device {
    id: String,
    name: String,
    manufacturer: String,
    model: String,
    stale_after: Duration,
    handlers: Handlers,
    notify: Mutex<()>,
    state: Mutex<DeviceState>,
}

impl Device {
    pub(crate) fn new(
        id: String,
        name: String,
        manufacturer: String,
        model: String,
        refresh_limit: u32,
        stale_after: Duration,
        store: StatusStore,
        handlers: Handlers,
    ) -> Self {
        Self {
            id,
            name,
            manufacturer,
            model,
            stale_after,
            handlers,
            notify: Mutex::new(()),
            state: Mutex::new(DeviceState {
                store,
                liveness: LivenessTracker::new(refresh_limit),
            }),
        }
    }

    /// Unique device id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Manufacturer string
    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }

    /// Model string
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a command to the hardware
    ///
    /// Dispatches to the set handler registered for `command`; an
    /// unregistered command is an addressing error. Transport failures are
    /// caught here, logged, and swallowed - the store keeps its last known
    /// value and a later poll retries naturally.
    pub fn set(&self, command: &str, value: impl Into<StatusValue>, qualifier: &Qualifier) -> Result<()> {
        let handler = self
            .handlers
            .set
            .get(command)
            .ok_or_else(|| self.unsupported(command))?;

        let value = value.into();
        if let Err(err) = handler(self, &value, qualifier) {
            tracing::warn!(
                device = %self.id,
                command,
                error = %err,
                "set handler transport failure, keeping last known status"
            );
        }
        Ok(())
    }

    /// Poll the hardware for one command's current state
    ///
    /// Same missing-handler and failure policy as [`Device::set`].
    pub fn update(&self, command: &str, qualifier: &Qualifier) -> Result<()> {
        let handler = self
            .handlers
            .update
            .get(command)
            .ok_or_else(|| self.unsupported(command))?;

        if let Err(err) = handler(self, qualifier) {
            tracing::warn!(
                device = %self.id,
                command,
                error = %err,
                "update handler transport failure, keeping last known status"
            );
        }
        Ok(())
    }

    /// Record confirmed or assumed device state
    ///
    /// Called by transport handlers and by asynchronous push paths. Any
    /// write resets the refresh counter and heals a disconnected device; a
    /// changed cell dispatches exactly one notification, with the state
    /// lock released. The notify lock stays held across the dispatch, so a
    /// later write on this device cannot deliver its notification first.
    pub fn write_status(
        &self,
        command: &str,
        value: impl Into<StatusValue>,
        qualifier: &Qualifier,
    ) -> Result<WriteOutcome> {
        let _notify = self.notify.lock();
        let (write, transition) = {
            let mut state = self.state.lock();
            let write = state
                .store
                .write(command, value.into(), qualifier)
                .map_err(|UnknownCommand(c)| self.unsupported(&c))?;
            let transition = state.liveness.record_write();
            (write, transition)
        };

        if let Some(status) = transition {
            tracing::info!(device = %self.id, ?status, "connection status changed");
        }

        match write {
            Write::Changed(notification) => {
                if let Some(notification) = notification {
                    notification.dispatch();
                }
                Ok(WriteOutcome::Changed)
            }
            Write::Unchanged => Ok(WriteOutcome::Unchanged),
            Write::PartialQualifier => {
                tracing::debug!(device = %self.id, command, "status write dropped: partial qualifier");
                Ok(WriteOutcome::PartialQualifier)
            }
        }
    }

    /// Read the cached live value for a command
    ///
    /// `Ok(None)` when the cell is undefined (never written, or addressed
    /// with a partial qualifier); only an unknown command is an error.
    pub fn read_status(&self, command: &str, qualifier: &Qualifier) -> Result<Option<StatusValue>> {
        self.state
            .lock()
            .store
            .read(command, qualifier)
            .map_err(|UnknownCommand(c)| self.unsupported(&c))
    }

    /// Register a change callback for one command + qualifier path
    ///
    /// One callback per path, last registration wins. A qualifier that
    /// omits a declared parameter is silently refused, mirroring the write
    /// policy.
    pub fn subscribe_status(
        &self,
        command: &str,
        qualifier: &Qualifier,
        callback: StatusCallback,
    ) -> Result<Subscribe> {
        let outcome = self
            .state
            .lock()
            .store
            .subscribe(command, qualifier, callback)
            .map_err(|UnknownCommand(c)| self.unsupported(&c))?;

        if outcome == Subscribe::PartialQualifier {
            tracing::debug!(device = %self.id, command, "subscription refused: partial qualifier");
        }
        Ok(outcome)
    }

    /// Record one missed connectivity checkpoint
    ///
    /// Driven by the polling clock. Past the refresh limit the device flips
    /// to `Disconnected` exactly once.
    pub fn liveness_checkpoint(&self) {
        let transition = self.state.lock().liveness.checkpoint();
        if let Some(status) = transition {
            tracing::warn!(device = %self.id, ?status, "device aged out without status traffic");
        }
    }

    /// Current connection status
    pub fn connection_status(&self) -> ConnectionStatus {
        self.state.lock().liveness.status()
    }

    /// When the connection status last changed
    pub fn last_status_change(&self) -> Option<Instant> {
        self.state.lock().liveness.last_change()
    }

    /// Display health (fresh / stale / dead); never gates set/update calls
    pub fn health(&self) -> Health {
        self.state.lock().liveness.health(self.stale_after)
    }

    /// Whether the device defines a command (settable, pollable, or
    /// feedback-only)
    pub fn has_command(&self, command: &str) -> bool {
        self.state.lock().store.contains(command)
    }

    fn unsupported(&self, command: &str) -> DeviceError {
        DeviceError::UnsupportedCommand {
            device: self.id.clone(),
            command: command.to_string(),
        }
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("manufacturer", &self.manufacturer)
            .field("model", &self.model)
            .finish()
    }
}
