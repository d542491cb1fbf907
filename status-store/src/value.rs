//! Status values exchanged with device drivers
//!
//! Device feedback is heterogeneous (tie numbers, mute flags, power strings),
//! so live cells hold a small tagged value rather than a compile-time type.
//! `StatusValue` is `Eq + Hash` on purpose: qualifier values double as
//! address components (see [`crate::StatusKey`]).

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single unit of device state: one cell's live value, or one qualifier
/// component.
///
/// # Example
///
/// ```rust
/// use status_store::StatusValue;
///
/// let tie: StatusValue = 3.into();
/// let mute: StatusValue = true.into();
/// let mode: StatusValue = "PresentationMode".into();
///
/// assert_eq!(tie, StatusValue::Int(3));
/// assert_ne!(mute, StatusValue::Bool(false));
/// assert_eq!(mode.to_string(), "PresentationMode");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusValue {
    /// Boolean feedback (mute, occupancy, power)
    Bool(bool),
    /// Numeric feedback (tie numbers, volume steps, input indices)
    Int(i64),
    /// Textual feedback (mode names, firmware strings)
    Text(String),
}

impl StatusValue {
    /// Interpret the value as a boolean, if it is one
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StatusValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Interpret the value as an integer, if it is one
    pub fn as_int(&self) -> Option<i64> {
        match self {
            StatusValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Interpret the value as text, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StatusValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for StatusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusValue::Bool(b) => write!(f, "{}", b),
            StatusValue::Int(n) => write!(f, "{}", n),
            StatusValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for StatusValue {
    fn from(value: bool) -> Self {
        StatusValue::Bool(value)
    }
}

impl From<i64> for StatusValue {
    fn from(value: i64) -> Self {
        StatusValue::Int(value)
    }
}

impl From<i32> for StatusValue {
    fn from(value: i32) -> Self {
        StatusValue::Int(value as i64)
    }
}

impl From<u32> for StatusValue {
    fn from(value: u32) -> Self {
        StatusValue::Int(value as i64)
    }
}

impl From<&str> for StatusValue {
    fn from(value: &str) -> Self {
        StatusValue::Text(value.to_string())
    }
}

impl From<String> for StatusValue {
    fn from(value: String) -> Self {
        StatusValue::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(StatusValue::Bool(true).as_bool(), Some(true));
        assert_eq!(StatusValue::Int(7).as_int(), Some(7));
        assert_eq!(StatusValue::Text("On".into()).as_text(), Some("On"));

        assert_eq!(StatusValue::Int(7).as_bool(), None);
        assert_eq!(StatusValue::Bool(true).as_int(), None);
    }

    #[test]
    fn test_from_impls() {
        assert_eq!(StatusValue::from(3i32), StatusValue::Int(3));
        assert_eq!(StatusValue::from(3u32), StatusValue::Int(3));
        assert_eq!(StatusValue::from("x"), StatusValue::Text("x".into()));
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusValue::Bool(false).to_string(), "false");
        assert_eq!(StatusValue::Int(42).to_string(), "42");
    }
}
