//! Per-device status storage with change detection
//!
//! One `StatusStore` backs one device facade. Each defined command owns a
//! flat map of live cells keyed by canonical address, plus the subscription
//! table shaped the same way. The store carries no lock of its own: the
//! owning facade serializes access, which is what gives writes and their
//! notifications a strict per-device order.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::command::{CommandSpec, Qualifier, StatusKey};
use crate::update::{Notification, StatusCallback, StatusUpdate};
use crate::value::StatusValue;

/// Outcome of a status write
///
/// The partial-qualifier case is an outcome, not an error: callers drive
/// polymorphic device sets with shared qualifiers and rely on irrelevant
/// writes falling through without effect. It is still distinguishable so
/// misconfiguration can be logged and asserted on.
#[derive(Debug)]
pub enum Write {
    /// The cell changed (first write, or a different value). Holds the one
    /// exact-match notification to dispatch, if that path is subscribed.
    Changed(Option<Notification>),
    /// The cell already held this value; nothing fires
    Unchanged,
    /// The qualifier omits a declared parameter; nothing was touched
    PartialQualifier,
}

/// Outcome of a subscription attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscribe {
    /// Callback registered (replacing any previous callback on this path)
    Registered,
    /// The qualifier omits a declared parameter; nothing was registered
    PartialQualifier,
}

/// The command name is not defined on this store
///
/// Unlike a partial qualifier this is a programmer error and is always
/// surfaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command: {}", self.0)
    }
}

impl std::error::Error for UnknownCommand {}

struct CommandSlot {
    spec: CommandSpec,
    cells: HashMap<StatusKey, StatusValue>,
    subscriptions: HashMap<StatusKey, StatusCallback>,
}

/// Status cache for one device
///
/// # Example
///
/// ```rust
/// use status_store::{CommandSpec, Qualifier, StatusStore, Write};
///
/// let mut store = StatusStore::new();
/// store.define(CommandSpec::new("OutputMute", ["Output"]));
///
/// let q = Qualifier::new().with("Output", 3);
///
/// // First write is a change...
/// assert!(matches!(store.write("OutputMute", true.into(), &q).unwrap(), Write::Changed(_)));
/// // ...repeating it is not.
/// assert!(matches!(store.write("OutputMute", true.into(), &q).unwrap(), Write::Unchanged));
/// ```
#[derive(Default)]
pub struct StatusStore {
    commands: HashMap<String, CommandSlot>,
}

impl StatusStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command definition
    ///
    /// Definitions are created once at device construction and live for the
    /// process lifetime; redefining a name replaces the spec and drops its
    /// cells and subscriptions.
    pub fn define(&mut self, spec: CommandSpec) {
        self.commands.insert(
            spec.name().to_string(),
            CommandSlot {
                spec,
                cells: HashMap::new(),
                subscriptions: HashMap::new(),
            },
        );
    }

    /// Whether a command is defined
    pub fn contains(&self, command: &str) -> bool {
        self.commands.contains_key(command)
    }

    /// Look up a command's definition
    pub fn spec(&self, command: &str) -> Option<&CommandSpec> {
        self.commands.get(command).map(|slot| &slot.spec)
    }

    /// Defined command names, in no particular order
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    /// Write a live value, detecting change
    ///
    /// A changed cell yields at most one [`Notification`] - the callback
    /// registered at the exactly matching path, with the same addressing the
    /// write used. The caller dispatches it after releasing its lock.
    pub fn write(
        &mut self,
        command: &str,
        value: StatusValue,
        qualifier: &Qualifier,
    ) -> Result<Write, UnknownCommand> {
        let slot = self
            .commands
            .get_mut(command)
            .ok_or_else(|| UnknownCommand(command.to_string()))?;

        let key = match slot.spec.address(qualifier) {
            Some(key) => key,
            None => return Ok(Write::PartialQualifier),
        };

        if slot.cells.get(&key) == Some(&value) {
            return Ok(Write::Unchanged);
        }
        slot.cells.insert(key.clone(), value.clone());

        let notification = slot.subscriptions.get(&key).map(|callback| Notification {
            callback: Arc::clone(callback),
            update: StatusUpdate {
                command: command.to_string(),
                value,
                qualifier: qualifier.clone(),
            },
        });

        Ok(Write::Changed(notification))
    }

    /// Read a live value
    ///
    /// Returns `Ok(None)` when the path or leaf is undefined, including the
    /// partial-qualifier case; only an unknown command is an error.
    pub fn read(
        &self,
        command: &str,
        qualifier: &Qualifier,
    ) -> Result<Option<StatusValue>, UnknownCommand> {
        let slot = self
            .commands
            .get(command)
            .ok_or_else(|| UnknownCommand(command.to_string()))?;

        Ok(slot
            .spec
            .address(qualifier)
            .and_then(|key| slot.cells.get(&key).cloned()))
    }

    /// Register a change callback at one qualifier path
    ///
    /// One callback per path; the last registration wins. There is no
    /// wildcard or prefix matching - subscribing with an empty qualifier
    /// only fires for writes made with an empty qualifier.
    pub fn subscribe(
        &mut self,
        command: &str,
        qualifier: &Qualifier,
        callback: StatusCallback,
    ) -> Result<Subscribe, UnknownCommand> {
        let slot = self
            .commands
            .get_mut(command)
            .ok_or_else(|| UnknownCommand(command.to_string()))?;

        match slot.spec.address(qualifier) {
            Some(key) => {
                slot.subscriptions.insert(key, callback);
                Ok(Subscribe::Registered)
            }
            None => Ok(Subscribe::PartialQualifier),
        }
    }
}

impl fmt::Debug for StatusStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusStore")
            .field("command_count", &self.commands.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn tie_store() -> StatusStore {
        let mut store = StatusStore::new();
        store.define(CommandSpec::new("Tie", ["Input", "Output"]));
        store.define(CommandSpec::scalar("Power"));
        store
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let mut store = tie_store();
        let q = Qualifier::new().with("Input", 1).with("Output", 2);

        assert_eq!(store.read("Tie", &q).unwrap(), None);
        store.write("Tie", StatusValue::Int(1), &q).unwrap();
        assert_eq!(store.read("Tie", &q).unwrap(), Some(StatusValue::Int(1)));
    }

    #[test]
    fn test_change_detection_fires_once() {
        let mut store = tie_store();
        let q = Qualifier::new().with("Input", 1).with("Output", 2);
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        store
            .subscribe(
                "Tie",
                &q,
                Arc::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        for _ in 0..3 {
            if let Write::Changed(Some(n)) =
                store.write("Tie", StatusValue::Int(5), &q).unwrap()
            {
                n.dispatch();
            }
        }

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_addressing_isolation() {
        let mut store = tie_store();
        let q1 = Qualifier::new().with("Input", 1).with("Output", 2);
        let q2 = Qualifier::new().with("Input", 1).with("Output", 3);

        store.write("Tie", StatusValue::Int(9), &q1).unwrap();

        assert_eq!(store.read("Tie", &q1).unwrap(), Some(StatusValue::Int(9)));
        assert_eq!(store.read("Tie", &q2).unwrap(), None);
    }

    #[test]
    fn test_partial_qualifier_is_a_silent_outcome() {
        let mut store = tie_store();
        let full = Qualifier::new().with("Input", 1).with("Output", 2);
        let partial = Qualifier::new().with("Input", 1);

        store.write("Tie", StatusValue::Int(4), &full).unwrap();

        let outcome = store.write("Tie", StatusValue::Int(99), &partial).unwrap();
        assert!(matches!(outcome, Write::PartialQualifier));

        // Nothing was touched.
        assert_eq!(store.read("Tie", &full).unwrap(), Some(StatusValue::Int(4)));

        let sub = store
            .subscribe("Tie", &partial, Arc::new(|_| {}))
            .unwrap();
        assert_eq!(sub, Subscribe::PartialQualifier);
    }

    #[test]
    fn test_unknown_command_is_an_error() {
        let mut store = tie_store();
        let q = Qualifier::new();

        assert!(store.write("Nope", StatusValue::Int(0), &q).is_err());
        assert!(store.read("Nope", &q).is_err());
        assert!(store.subscribe("Nope", &q, Arc::new(|_| {})).is_err());
    }

    #[test]
    fn test_no_prefix_fanout() {
        let mut store = tie_store();
        let fired = Arc::new(AtomicUsize::new(0));

        // Subscribe to the scalar path of a parameterized command's sibling:
        // an unqualified subscription on "Power" must not hear qualified
        // "Tie" traffic, and vice versa.
        let counter = Arc::clone(&fired);
        store
            .subscribe(
                "Power",
                &Qualifier::new(),
                Arc::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        let q = Qualifier::new().with("Input", 1).with("Output", 2);
        if let Write::Changed(n) = store.write("Tie", StatusValue::Int(1), &q).unwrap() {
            assert!(n.is_none());
        }
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        if let Write::Changed(Some(n)) = store
            .write("Power", StatusValue::Bool(true), &Qualifier::new())
            .unwrap()
        {
            n.dispatch();
        }
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_last_subscription_wins() {
        let mut store = tie_store();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let c1 = Arc::clone(&first);
        let c2 = Arc::clone(&second);
        let q = Qualifier::new();

        store
            .subscribe("Power", &q, Arc::new(move |_| {
                c1.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        store
            .subscribe("Power", &q, Arc::new(move |_| {
                c2.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        if let Write::Changed(Some(n)) =
            store.write("Power", StatusValue::Bool(true), &q).unwrap()
        {
            n.dispatch();
        }

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_update_payload_addressing() {
        let mut store = tie_store();
        let q = Qualifier::new().with("Input", 7).with("Output", 8);

        store
            .subscribe(
                "Tie",
                &q,
                Arc::new(|update: &StatusUpdate| {
                    assert_eq!(update.command, "Tie");
                    assert_eq!(update.value, StatusValue::Int(7));
                    assert_eq!(update.qualifier.get("Output"), Some(&StatusValue::Int(8)));
                }),
            )
            .unwrap();

        if let Write::Changed(Some(n)) = store.write("Tie", StatusValue::Int(7), &q).unwrap() {
            n.dispatch();
        }
    }
}
