//! Status change notifications
//!
//! A changed cell produces at most one `StatusUpdate`, delivered to the one
//! callback registered at the exactly matching qualifier path.

use std::fmt;
use std::sync::Arc;

use crate::command::Qualifier;
use crate::value::StatusValue;

/// Callback invoked when a subscribed cell changes value
///
/// Shared so the store can hand it back to the caller for dispatch outside
/// the owning device's lock.
pub type StatusCallback = Arc<dyn Fn(&StatusUpdate) + Send + Sync>;

/// Payload delivered to a subscription callback on change
///
/// Carries the same addressing the write used, so a callback registered for
/// several commands can tell them apart.
#[derive(Clone)]
pub struct StatusUpdate {
    /// Command whose cell changed
    pub command: String,
    /// The new live value
    pub value: StatusValue,
    /// Qualifier the write was addressed with
    pub qualifier: Qualifier,
}

impl fmt::Debug for StatusUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusUpdate")
            .field("command", &self.command)
            .field("value", &self.value)
            .field("qualifier", &self.qualifier)
            .finish()
    }
}

/// A pending notification: the matched callback plus its payload
///
/// Returned from [`crate::StatusStore::write`] so the caller decides where
/// dispatch happens; the store itself never runs user code.
pub struct Notification {
    pub(crate) callback: StatusCallback,
    pub(crate) update: StatusUpdate,
}

impl Notification {
    /// The payload that will be delivered
    pub fn update(&self) -> &StatusUpdate {
        &self.update
    }

    /// Invoke the callback with the payload, consuming the notification
    pub fn dispatch(self) {
        (self.callback)(&self.update);
    }
}

impl fmt::Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notification")
            .field("update", &self.update)
            .finish()
    }
}
