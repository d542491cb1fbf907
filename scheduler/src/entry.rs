//! Polling entries and clock modes

use std::sync::Arc;

use roomctl_device::Device;
use status_store::Qualifier;

/// Default refresh period while the room is occupied, in clock ticks
pub const DEFAULT_ACTIVE_EVERY: u64 = 10;
/// Default refresh period while the room is empty, in clock ticks
pub const DEFAULT_INACTIVE_EVERY: u64 = 60;

/// Which coarse clock is running
///
/// The two clocks are mutually exclusive: an occupied room polls on the
/// shorter active periods, an empty room on the longer inactive ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollingMode {
    /// Room occupied - shorter periods
    Active,
    /// Room empty - longer periods
    Inactive,
}

/// One scheduled poll: a device command refreshed on a divisor of the clock
///
/// Identity is `(device id, command)`; re-adding an entry for the same pair
/// replaces it (the qualifier and periods are overwritable detail).
pub struct PollingEntry {
    pub(crate) device: Arc<Device>,
    pub(crate) command: String,
    pub(crate) qualifier: Qualifier,
    pub(crate) active_every: u64,
    pub(crate) inactive_every: u64,
}

impl PollingEntry {
    /// Poll `command` on `device` at the default periods
    pub fn new<C: Into<String>>(device: Arc<Device>, command: C, qualifier: Qualifier) -> Self {
        Self {
            device,
            command: command.into(),
            qualifier,
            active_every: DEFAULT_ACTIVE_EVERY,
            inactive_every: DEFAULT_INACTIVE_EVERY,
        }
    }

    /// Refresh period (in ticks) while the active clock runs
    pub fn active_every(mut self, ticks: u64) -> Self {
        self.active_every = ticks.max(1);
        self
    }

    /// Refresh period (in ticks) while the inactive clock runs
    pub fn inactive_every(mut self, ticks: u64) -> Self {
        self.inactive_every = ticks.max(1);
        self
    }

    /// The device this entry polls
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    /// The polled command
    pub fn command(&self) -> &str {
        &self.command
    }

    pub(crate) fn period(&self, mode: PollingMode) -> u64 {
        match mode {
            PollingMode::Active => self.active_every,
            PollingMode::Inactive => self.inactive_every,
        }
    }

    pub(crate) fn key(&self) -> (String, String) {
        (self.device.id().to_string(), self.command.clone())
    }
}

impl std::fmt::Debug for PollingEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingEntry")
            .field("device", &self.device.id())
            .field("command", &self.command)
            .field("active_every", &self.active_every)
            .field("inactive_every", &self.inactive_every)
            .finish()
    }
}
