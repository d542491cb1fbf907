//! RoomSystem - the controller's single entry point
//!
//! Owns the device registry, the polling scheduler, the activity machine,
//! and their clocks, and exposes the device-id-addressed surface the UI
//! layer and domain controllers call. Fully synchronous: every method
//! returns immediately, with device I/O running on the scheduler's worker
//! pool or inside caller-supplied hooks.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use roomctl_activity::{
    spawn_phase_clock, Activity, ActivityHooks, ActivityMachine, CountdownObserver,
    PhaseClockHandle, PhaseTimings, SystemState,
};
use roomctl_device::{Device, DeviceError, DeviceRegistry};
use roomctl_scheduler::{
    spawn_clock, ClockHandle, PollingEntry, PollingMode, PollingScheduler, SchedulerConfig,
};
use status_store::{Qualifier, StatusCallback, StatusValue, Subscribe};

use crate::config::PollingConfig;
use crate::error::{Result, RoomError};

/// Construction parameters for a [`RoomSystem`]
#[derive(Debug, Clone)]
pub struct RoomSystemConfig {
    /// Phase tick budgets for the activity machine
    pub timings: PhaseTimings,
    /// Panel inactivity budget before an off room requests the idle page
    pub idle_threshold: u64,
    /// Poll worker pool sizing
    pub scheduler: SchedulerConfig,
    /// Clock cadence for both the polling and phase clocks
    pub tick_period: Duration,
}

impl Default for RoomSystemConfig {
    fn default() -> Self {
        Self {
            timings: PhaseTimings::default(),
            idle_threshold: 600,
            scheduler: SchedulerConfig::default(),
            tick_period: Duration::from_secs(1),
        }
    }
}

#[derive(Default)]
struct Clocks {
    polling: Option<ClockHandle>,
    phase: Option<PhaseClockHandle>,
}

/// The room-automation controller core
///
/// # Example
///
/// ```rust,ignore
/// use roomctl::{Activity, ActivityHooks, PollingMode, RoomSystem};
///
/// let system = RoomSystem::new(room_hooks());
/// system.add_device(build_switcher()?);
/// system.add_polling("switcher", "InputTieStatus", tie_qualifier(), 5, 60)?;
///
/// system.start(); // seed every status store, then run the clocks
///
/// // UI button handlers:
/// system.system_start(Activity::Share);
/// system.set("switcher", "Tie", 3, &output_4())?;
///
/// // Occupancy sensor:
/// system.set_polling_mode(PollingMode::Inactive);
/// ```
pub struct RoomSystem {
    registry: Arc<DeviceRegistry>,
    scheduler: Arc<PollingScheduler>,
    activity: Arc<ActivityMachine>,
    tick_period: Duration,
    clocks: Mutex<Clocks>,
}

impl RoomSystem {
    /// Create a system with default configuration and the given room hooks
    pub fn new(hooks: ActivityHooks) -> Self {
        Self::with_config(RoomSystemConfig::default(), hooks)
    }

    /// Create a system with explicit configuration
    pub fn with_config(config: RoomSystemConfig, hooks: ActivityHooks) -> Self {
        let registry = Arc::new(DeviceRegistry::new());
        let scheduler = Arc::new(PollingScheduler::new(
            Arc::clone(&registry),
            config.scheduler,
        ));
        let activity = Arc::new(ActivityMachine::new(
            config.timings,
            hooks,
            config.idle_threshold,
        ));

        Self {
            registry,
            scheduler,
            activity,
            tick_period: config.tick_period,
            clocks: Mutex::new(Clocks::default()),
        }
    }

    // ------------------------------------------------------------------
    // Devices
    // ------------------------------------------------------------------

    /// Register a device
    pub fn add_device(&self, device: Arc<Device>) {
        self.registry.add(device);
    }

    /// Register a device together with its polling declarations from the
    /// room description
    ///
    /// Every declared command is validated against the device first, so a
    /// typo in the configuration fails here instead of surfacing as logged
    /// poll errors at runtime. Callbacks attach separately via
    /// [`RoomSystem::add_polling_with_callback`].
    pub fn add_device_with_polling(
        &self,
        device: Arc<Device>,
        polling: &[PollingConfig],
    ) -> Result<()> {
        for entry in polling {
            if !device.has_command(&entry.command) {
                return Err(RoomError::Device(DeviceError::UnsupportedCommand {
                    device: device.id().to_string(),
                    command: entry.command.clone(),
                }));
            }
        }

        self.registry.add(Arc::clone(&device));
        for entry in polling {
            self.scheduler.add(
                PollingEntry::new(Arc::clone(&device), &entry.command, entry.qualifier.clone())
                    .active_every(entry.active_every)
                    .inactive_every(entry.inactive_every),
            );
        }
        Ok(())
    }

    /// Look up a device by id
    pub fn device(&self, id: &str) -> Option<Arc<Device>> {
        self.registry.get(id)
    }

    /// The shared device registry
    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    // ------------------------------------------------------------------
    // Command surface
    // ------------------------------------------------------------------

    /// Send a command to a device
    pub fn set(
        &self,
        device_id: &str,
        command: &str,
        value: impl Into<StatusValue>,
        qualifier: &Qualifier,
    ) -> Result<()> {
        self.lookup(device_id)?.set(command, value, qualifier)?;
        Ok(())
    }

    /// Poll one command on a device
    pub fn update(&self, device_id: &str, command: &str, qualifier: &Qualifier) -> Result<()> {
        self.lookup(device_id)?.update(command, qualifier)?;
        Ok(())
    }

    /// Read a device's cached live value
    pub fn read_status(
        &self,
        device_id: &str,
        command: &str,
        qualifier: &Qualifier,
    ) -> Result<Option<StatusValue>> {
        Ok(self.lookup(device_id)?.read_status(command, qualifier)?)
    }

    /// Register a change callback on a device command
    pub fn subscribe_status(
        &self,
        device_id: &str,
        command: &str,
        qualifier: &Qualifier,
        callback: StatusCallback,
    ) -> Result<Subscribe> {
        Ok(self
            .lookup(device_id)?
            .subscribe_status(command, qualifier, callback)?)
    }

    // ------------------------------------------------------------------
    // Polling
    // ------------------------------------------------------------------

    /// Register (or replace) a polling entry for a device command
    pub fn add_polling(
        &self,
        device_id: &str,
        command: &str,
        qualifier: Qualifier,
        active_every: u64,
        inactive_every: u64,
    ) -> Result<()> {
        let device = self.lookup(device_id)?;
        self.scheduler.add(
            PollingEntry::new(device, command, qualifier)
                .active_every(active_every)
                .inactive_every(inactive_every),
        );
        Ok(())
    }

    /// Register a polling entry and a change callback for the same command
    /// and qualifier in one call
    pub fn add_polling_with_callback(
        &self,
        device_id: &str,
        command: &str,
        qualifier: Qualifier,
        active_every: u64,
        inactive_every: u64,
        callback: StatusCallback,
    ) -> Result<()> {
        let device = self.lookup(device_id)?;
        self.scheduler.add_with_callback(
            PollingEntry::new(device, command, qualifier)
                .active_every(active_every)
                .inactive_every(inactive_every),
            callback,
        )?;
        Ok(())
    }

    /// Switch between occupied-room and empty-room polling cadences
    pub fn set_polling_mode(&self, mode: PollingMode) {
        self.scheduler.set_mode(mode);
    }

    /// Refresh every polled command immediately, regardless of clock state
    pub fn poll_everything(&self) {
        self.scheduler.poll_everything();
    }

    /// The polling scheduler (tests drive its ticks directly)
    pub fn scheduler(&self) -> &Arc<PollingScheduler> {
        &self.scheduler
    }

    // ------------------------------------------------------------------
    // Activities
    // ------------------------------------------------------------------

    /// Begin powering the room up into an activity
    pub fn system_start(&self, activity: Activity) -> bool {
        self.activity.system_start(activity)
    }

    /// Change the running activity
    pub fn system_switch(&self, activity: Activity) -> bool {
        self.activity.system_switch(activity)
    }

    /// Begin powering the room down
    pub fn system_shutdown(&self) -> bool {
        self.activity.system_shutdown()
    }

    /// Open the shutdown confirmation window
    pub fn start_shutdown_confirmation(&self) -> bool {
        self.activity.start_shutdown_confirmation()
    }

    /// Abort a pending shutdown confirmation
    pub fn cancel_shutdown(&self) -> bool {
        self.activity.cancel_shutdown()
    }

    /// Current lifecycle state
    pub fn state(&self) -> SystemState {
        self.activity.state()
    }

    /// The running activity, if any
    pub fn current_activity(&self) -> Option<Activity> {
        self.activity.current_activity()
    }

    /// Register a per-panel countdown observer
    pub fn add_countdown_observer(&self, observer: CountdownObserver) {
        self.activity.add_countdown_observer(observer);
    }

    /// Register a touch panel with the idle tracker
    pub fn register_panel<I: Into<String>>(&self, panel: I) {
        self.activity.register_panel(panel);
    }

    /// Record user activity on a panel
    pub fn panel_activity(&self, panel: &str) {
        self.activity.panel_activity(panel);
    }

    /// The activity machine (tests drive its ticks directly)
    pub fn activity(&self) -> &Arc<ActivityMachine> {
        &self.activity
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Seed every status store, then start the polling and phase clocks
    ///
    /// Idempotent: calling on a running system only repeats the seed pass.
    pub fn start(&self) {
        self.scheduler.poll_everything();

        let mut clocks = self.clocks.lock();
        if clocks.polling.is_none() {
            clocks.polling = Some(spawn_clock(Arc::clone(&self.scheduler), self.tick_period));
        }
        if clocks.phase.is_none() {
            clocks.phase = Some(spawn_phase_clock(Arc::clone(&self.activity), self.tick_period));
        }
        tracing::info!(devices = self.registry.len(), "room system running");
    }

    /// Stop both clocks
    ///
    /// Also happens on drop. Device state and registrations survive, so a
    /// later [`RoomSystem::start`] resumes cleanly.
    pub fn shutdown(&self) {
        let mut clocks = self.clocks.lock();
        if let Some(clock) = clocks.polling.take() {
            clock.shutdown();
        }
        if let Some(clock) = clocks.phase.take() {
            clock.shutdown();
        }
    }

    fn lookup(&self, device_id: &str) -> Result<Arc<Device>> {
        self.registry.get(device_id).ok_or_else(|| {
            tracing::warn!(device = device_id, "lookup for unregistered device");
            RoomError::DeviceNotFound(device_id.to_string())
        })
    }
}

impl Drop for RoomSystem {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for RoomSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomSystem")
            .field("devices", &self.registry.len())
            .field("state", &self.state())
            .finish()
    }
}
