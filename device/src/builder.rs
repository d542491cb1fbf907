//! Device construction
//!
//! Commands, handlers, and liveness parameters are fixed at construction
//! time. Handlers live in an explicit registry rather than behind any
//! convention-named dynamic dispatch, so "unknown command" stays a loud
//! addressing error without reflection.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use status_store::{CommandSpec, StatusStore};

use crate::device::{Device, Handlers, SetHandler, UpdateHandler};
use crate::error::{DeviceError, Result};

const DEFAULT_REFRESH_LIMIT: u32 = 30;
const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(60);

/// Builder for [`Device`]
///
/// # Example
///
/// ```rust,ignore
/// use roomctl_device::DeviceBuilder;
/// use status_store::{CommandSpec, Qualifier};
///
/// let switcher = DeviceBuilder::new("dsp-1")
///     .name("Matrix Switcher")
///     .manufacturer("Extron")
///     .model("DTP CrossPoint 84")
///     .command(CommandSpec::new("InputTieStatus", ["Input", "Output"]))
///     .on_update("InputTieStatus", |device, qualifier| {
///         let tied = query_tie(qualifier)?; // transport call
///         device.write_status("InputTieStatus", tied, qualifier)?;
///         Ok(())
///     })
///     .build()?;
/// ```
pub struct DeviceBuilder {
    id: String,
    name: String,
    manufacturer: String,
    model: String,
    refresh_limit: u32,
    stale_after: Duration,
    specs: Vec<CommandSpec>,
    set_handlers: HashMap<String, SetHandler>,
    update_handlers: HashMap<String, UpdateHandler>,
}

impl DeviceBuilder {
    /// Start building a device with the given unique id
    pub fn new<I: Into<String>>(id: I) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            manufacturer: String::new(),
            model: String::new(),
            refresh_limit: DEFAULT_REFRESH_LIMIT,
            stale_after: DEFAULT_STALE_AFTER,
            specs: Vec::new(),
            set_handlers: HashMap::new(),
            update_handlers: HashMap::new(),
        }
    }

    /// Human-readable name (defaults to the id)
    pub fn name<N: Into<String>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Manufacturer string
    pub fn manufacturer<M: Into<String>>(mut self, manufacturer: M) -> Self {
        self.manufacturer = manufacturer.into();
        self
    }

    /// Model string
    pub fn model<M: Into<String>>(mut self, model: M) -> Self {
        self.model = model.into();
        self
    }

    /// Missed-checkpoint count after which the device reads disconnected
    pub fn refresh_limit(mut self, limit: u32) -> Self {
        self.refresh_limit = limit;
        self
    }

    /// How long a connected device stays `Fresh` without a status change
    pub fn stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Define a command (its qualifier parameters, in address order)
    pub fn command(mut self, spec: CommandSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Register the transport handler that sends `command`
    pub fn on_set<F>(mut self, command: &str, handler: F) -> Self
    where
        F: Fn(&Device, &status_store::StatusValue, &status_store::Qualifier)
                -> std::result::Result<(), crate::TransportError>
            + Send
            + Sync
            + 'static,
    {
        self.set_handlers
            .insert(command.to_string(), Box::new(handler));
        self
    }

    /// Register the transport handler that polls `command`
    ///
    /// Commands without one are feedback-only.
    pub fn on_update<F>(mut self, command: &str, handler: F) -> Self
    where
        F: Fn(&Device, &status_store::Qualifier) -> std::result::Result<(), crate::TransportError>
            + Send
            + Sync
            + 'static,
    {
        self.update_handlers
            .insert(command.to_string(), Box::new(handler));
        self
    }

    /// Finish construction
    ///
    /// Fails if any handler names a command no [`CommandSpec`] defined.
    /// That is the one misconfiguration the permissive qualifier policy
    /// cannot be allowed to hide.
    pub fn build(self) -> Result<Arc<Device>> {
        let mut store = StatusStore::new();
        for spec in self.specs {
            store.define(spec);
        }

        for command in self.set_handlers.keys().chain(self.update_handlers.keys()) {
            if !store.contains(command) {
                return Err(DeviceError::UndefinedCommand {
                    device: self.id,
                    command: command.clone(),
                });
            }
        }

        Ok(Arc::new(Device::new(
            self.id,
            self.name,
            self.manufacturer,
            self.model,
            self.refresh_limit,
            self.stale_after,
            store,
            Handlers {
                set: self.set_handlers,
                update: self.update_handlers,
            },
        )))
    }
}
