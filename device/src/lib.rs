//! Device facade for room-automation hardware
//!
//! Every driver - matrix switcher, display, microphone, camera, wireless
//! pod - implements the same four-verb contract, so hundreds of UI widgets
//! and the room-wide activity machine can address heterogeneous hardware
//! uniformly:
//!
//! - [`Device::set`] - send a command (dispatches to a transport handler)
//! - [`Device::update`] - poll one command's state
//! - [`Device::read_status`] - read the cached live value
//! - [`Device::subscribe_status`] - change-detection callback fan-out
//!
//! Wire protocols live entirely in the set/update handlers supplied at
//! construction; they report learned state back via
//! [`Device::write_status`], which also drives the connection-liveness
//! tracker as a pure side effect of write traffic.
//!
//! ```rust
//! use roomctl_device::DeviceBuilder;
//! use status_store::{CommandSpec, Qualifier};
//!
//! let display = DeviceBuilder::new("disp-1")
//!     .name("Front Display")
//!     .command(CommandSpec::scalar("Power"))
//!     .on_set("Power", |device, value, qualifier| {
//!         // transport call would go here; record the assumed state
//!         device.write_status("Power", value.clone(), qualifier).ok();
//!         Ok(())
//!     })
//!     .build()
//!     .unwrap();
//!
//! display.set("Power", true, &Qualifier::new()).unwrap();
//! assert_eq!(
//!     display.read_status("Power", &Qualifier::new()).unwrap(),
//!     Some(true.into())
//! );
//! ```

pub mod builder;
pub mod connection;
pub mod device;
pub mod error;
pub mod registry;

pub use builder::DeviceBuilder;
pub use connection::{ConnectionStatus, Health, LivenessTracker};
pub use device::{Device, SetHandler, UpdateHandler, WriteOutcome};
pub use error::{DeviceError, Result, TransportError};
pub use registry::DeviceRegistry;

// Re-exported so driver code needs only this crate.
pub use status_store::{CommandSpec, Qualifier, StatusCallback, StatusUpdate, StatusValue};
