//! # roomctl - room-automation controller core
//!
//! Drives AV hardware (matrix switchers, displays, microphones, cameras,
//! wireless-presentation pods) behind a uniform command/status abstraction,
//! keeps that state fresh with an occupancy-aware polling scheduler, and
//! sequences room-wide power and mode changes with a budgeted activity
//! state machine.
//!
//! ```rust,ignore
//! use roomctl::{logging, Activity, ActivityHooks, LoggingMode, RoomSystem};
//!
//! fn main() -> Result<(), roomctl::RoomError> {
//!     logging::init_logging(LoggingMode::Development).ok();
//!
//!     let system = RoomSystem::new(room_hooks());
//!     for device in build_devices()? {
//!         system.add_device(device);
//!     }
//!     system.start(); // seed status stores, run the clocks
//!
//!     // UI button handler:
//!     system.system_start(Activity::Share);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! RoomSystem (sync entry point)
//!     ├── DeviceRegistry ── Device facades (set / update / read / subscribe)
//!     │        └── StatusStore + liveness tracker, one lock per device
//!     ├── PollingScheduler ── divisor clocks + bounded poll-worker pool
//!     └── ActivityMachine ── phase timers, countdown fan-out, idle tracker
//! ```
//!
//! Wire protocols never appear in this crate: each device's transport lives
//! in the set/update handlers supplied at construction, reporting learned
//! state back through `Device::write_status`.

pub mod config;
pub mod error;
pub mod logging;
pub mod system;

pub use config::{DeviceConfig, PollingConfig, RoomConfig};
pub use error::{Result, RoomError};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use system::{RoomSystem, RoomSystemConfig};

// The surface callers need, re-exported from the member crates.
pub use roomctl_activity::{
    Activity, ActivityHooks, ActivityMachine, IdleTracker, PhaseKind, PhaseTimings, SystemState,
};
pub use roomctl_device::{
    ConnectionStatus, Device, DeviceBuilder, DeviceError, DeviceRegistry, Health, TransportError,
    WriteOutcome,
};
pub use roomctl_scheduler::{PollingEntry, PollingMode, PollingScheduler, SchedulerConfig};
pub use status_store::{CommandSpec, Qualifier, StatusCallback, StatusUpdate, StatusValue};
