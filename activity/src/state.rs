//! Activity and system states

use std::fmt;

use serde::{Deserialize, Serialize};

/// A room activity the system can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    /// Single-source presentation
    Share,
    /// Multi-source advanced sharing
    AdvShare,
    /// Breakout group work
    GroupWork,
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activity::Share => write!(f, "share"),
            Activity::AdvShare => write!(f, "adv_share"),
            Activity::GroupWork => write!(f, "group_work"),
        }
    }
}

/// Where the room is in its activity lifecycle
///
/// Steady states (`Off` and `Steady`) have no running phase timer; every
/// other state owns exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemState {
    /// Everything powered down
    Off,
    /// Powering up toward an activity
    Starting(Activity),
    /// Running an activity
    Steady(Activity),
    /// Moving between activities
    Switching(Activity),
    /// Powering down
    ShuttingDown,
    /// Waiting for the user to confirm (or cancel) a shutdown
    ShutdownConfirming,
}

impl SystemState {
    /// The activity currently running, if the room is in a steady state
    pub fn current_activity(&self) -> Option<Activity> {
        match self {
            SystemState::Steady(activity) => Some(*activity),
            _ => None,
        }
    }

    /// Whether no phase timer is running
    pub fn is_steady(&self) -> bool {
        matches!(self, SystemState::Off | SystemState::Steady(_))
    }
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemState::Off => write!(f, "off"),
            SystemState::Starting(a) => write!(f, "starting({a})"),
            SystemState::Steady(a) => write!(f, "{a}"),
            SystemState::Switching(a) => write!(f, "switching({a})"),
            SystemState::ShuttingDown => write!(f, "shutting_down"),
            SystemState::ShutdownConfirming => write!(f, "shutdown_confirming"),
        }
    }
}

/// The four budgeted phase timers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    /// Bringing destinations up for an activity
    Startup,
    /// Re-routing between activities
    Switch,
    /// Bringing everything down
    Shutdown,
    /// The confirmation window before a shutdown
    ShutdownConfirm,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steady_states() {
        assert!(SystemState::Off.is_steady());
        assert!(SystemState::Steady(Activity::Share).is_steady());
        assert!(!SystemState::Starting(Activity::Share).is_steady());
        assert!(!SystemState::ShutdownConfirming.is_steady());
    }

    #[test]
    fn test_current_activity() {
        assert_eq!(SystemState::Off.current_activity(), None);
        assert_eq!(
            SystemState::Steady(Activity::GroupWork).current_activity(),
            Some(Activity::GroupWork)
        );
        assert_eq!(SystemState::Starting(Activity::Share).current_activity(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(SystemState::Starting(Activity::AdvShare).to_string(), "starting(adv_share)");
        assert_eq!(SystemState::Off.to_string(), "off");
    }
}
