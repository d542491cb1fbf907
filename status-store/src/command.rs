//! Command definitions and qualifier addressing
//!
//! A command is a named, optionally parameterized unit of device state
//! ("InputTieStatus" indexed by Input/Output/Tie Type, "Power" with no
//! parameters). A qualifier supplies one value per declared parameter;
//! projecting those values through the parameter list in declared order
//! yields the canonical flat address of one status cell.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::StatusValue;

/// Static definition of one device command
///
/// `parameters` lists the qualifier keys this command is indexed by, in
/// address order. Scalar commands declare no parameters.
///
/// # Example
///
/// ```rust
/// use status_store::{CommandSpec, Qualifier};
///
/// let spec = CommandSpec::new("InputTieStatus", ["Input", "Output", "Tie Type"]);
///
/// let q = Qualifier::new()
///     .with("Input", 2)
///     .with("Output", 5)
///     .with("Tie Type", "Audio");
///
/// assert!(spec.address(&q).is_some());
///
/// // A qualifier missing a declared parameter does not address anything.
/// let partial = Qualifier::new().with("Input", 2);
/// assert!(spec.address(&partial).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    name: String,
    #[serde(default)]
    parameters: Vec<String>,
}

impl CommandSpec {
    /// Define a command with its ordered parameter list
    pub fn new<N, P, I>(name: N, parameters: I) -> Self
    where
        N: Into<String>,
        P: Into<String>,
        I: IntoIterator<Item = P>,
    {
        Self {
            name: name.into(),
            parameters: parameters.into_iter().map(Into::into).collect(),
        }
    }

    /// Define a scalar command (no parameters)
    pub fn scalar<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    /// The command name, unique within a device
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The qualifier keys this command is indexed by, in address order
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Resolve a qualifier to the canonical cell address
    ///
    /// Returns `None` when the qualifier omits any declared parameter.
    /// Extra qualifier entries that this command does not declare are
    /// ignored, which is what lets one caller drive a polymorphic set of
    /// devices with a single qualifier.
    pub fn address(&self, qualifier: &Qualifier) -> Option<StatusKey> {
        let mut components = Vec::with_capacity(self.parameters.len());
        for parameter in &self.parameters {
            components.push(qualifier.get(parameter)?.clone());
        }
        Some(StatusKey(components))
    }
}

/// Caller-supplied parameter values selecting one instance of a
/// parameterized command's state
///
/// Backed by an ordered map so `Debug` output and iteration are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Qualifier(BTreeMap<String, StatusValue>);

impl Qualifier {
    /// Create an empty qualifier (addresses scalar commands)
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with<K, V>(mut self, parameter: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<StatusValue>,
    {
        self.0.insert(parameter.into(), value.into());
        self
    }

    /// Insert or replace a parameter value
    pub fn set<K, V>(&mut self, parameter: K, value: V)
    where
        K: Into<String>,
        V: Into<StatusValue>,
    {
        self.0.insert(parameter.into(), value.into());
    }

    /// Look up a parameter value
    pub fn get(&self, parameter: &str) -> Option<&StatusValue> {
        self.0.get(parameter)
    }

    /// Whether no parameters are set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of parameters set
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(parameter, value)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StatusValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Canonical flat address of one status cell: the qualifier values projected
/// through the command's parameter list in declared order
///
/// Two qualifiers that agree on every declared parameter produce the same
/// key regardless of any extra entries they carry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusKey(Vec<StatusValue>);

impl StatusKey {
    /// The address components in parameter order
    pub fn components(&self) -> &[StatusValue] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_order_follows_parameters() {
        let spec = CommandSpec::new("Tie", ["Input", "Output"]);

        // Qualifier iteration order (alphabetical) must not leak into the key.
        let q = Qualifier::new().with("Output", 5).with("Input", 2);
        let key = spec.address(&q).unwrap();

        assert_eq!(
            key.components(),
            &[StatusValue::Int(2), StatusValue::Int(5)]
        );
    }

    #[test]
    fn test_missing_parameter_yields_no_address() {
        let spec = CommandSpec::new("Tie", ["Input", "Output"]);
        let q = Qualifier::new().with("Input", 2);
        assert!(spec.address(&q).is_none());
    }

    #[test]
    fn test_extra_parameters_are_ignored() {
        let spec = CommandSpec::new("Mute", ["Channel"]);
        let q = Qualifier::new().with("Channel", 1).with("Output", 9);
        let bare = Qualifier::new().with("Channel", 1);

        assert_eq!(spec.address(&q), spec.address(&bare));
    }

    #[test]
    fn test_scalar_command_addresses_with_empty_qualifier() {
        let spec = CommandSpec::scalar("Power");
        let key = spec.address(&Qualifier::new()).unwrap();
        assert!(key.components().is_empty());
    }
}
