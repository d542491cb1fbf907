//! Per-device command/status cache with change detection
//!
//! Every device facade owns one [`StatusStore`]: a table mapping a command
//! name plus an ordered set of qualifier values to a live value, with an
//! exact-match subscription registry shaped the same way.
//!
//! # Addressing model
//!
//! A [`CommandSpec`] declares a command's qualifier keys in address order
//! (e.g. `["Input", "Output", "Tie Type"]`; empty for scalar commands). A
//! caller-supplied [`Qualifier`] is projected through that list to a
//! canonical flat [`StatusKey`], so addressing costs one map lookup instead
//! of a nested tree walk. A qualifier that omits a declared parameter
//! addresses nothing: writes fall through ([`Write::PartialQualifier`]) and
//! subscriptions are refused ([`Subscribe::PartialQualifier`]) without
//! touching existing state. Only an unknown command name is an error.
//!
//! # Change detection
//!
//! A cell's value changes at most once per write, and every change yields at
//! most one [`Notification`] - the callback registered at the exactly
//! matching path. There is no wildcard or prefix fan-out. The store never
//! runs user code itself: the owning facade dispatches notifications after
//! releasing its lock.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use status_store::{CommandSpec, Qualifier, StatusStore, Write};
//!
//! let mut store = StatusStore::new();
//! store.define(CommandSpec::new("InputTieStatus", ["Input", "Output"]));
//!
//! let q = Qualifier::new().with("Input", 2).with("Output", 5);
//! store.subscribe("InputTieStatus", &q, Arc::new(|update| {
//!     println!("{} -> {}", update.command, update.value);
//! })).unwrap();
//!
//! if let Write::Changed(Some(notification)) =
//!     store.write("InputTieStatus", 2.into(), &q).unwrap()
//! {
//!     notification.dispatch();
//! }
//! ```

pub mod command;
pub mod store;
pub mod update;
pub mod value;

pub use command::{CommandSpec, Qualifier, StatusKey};
pub use store::{StatusStore, Subscribe, UnknownCommand, Write};
pub use update::{Notification, StatusCallback, StatusUpdate};
pub use value::StatusValue;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::command::{CommandSpec, Qualifier};
    pub use crate::store::{StatusStore, Subscribe, Write};
    pub use crate::update::{StatusCallback, StatusUpdate};
    pub use crate::value::StatusValue;
}
