//! Phase tick budgets

use serde::{Deserialize, Serialize};

use crate::state::PhaseKind;

/// Soft time budgets for the four phase timers, in clock ticks
///
/// `max` is the hard budget: a phase always ends when its timer reaches it,
/// no matter what the hardware reports - timeouts are the sole escape from
/// a stuck device. `min` is the earliest tick at which the synced predicate
/// may end the phase early; the baseline configuration gives the switch
/// phase no minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTimings {
    pub startup_max: u64,
    pub startup_min: u64,
    pub switch_max: u64,
    pub switch_min: u64,
    pub shutdown_max: u64,
    pub shutdown_min: u64,
    pub shutdown_confirm_max: u64,
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self {
            startup_max: 90,
            startup_min: 10,
            switch_max: 30,
            switch_min: 0,
            shutdown_max: 60,
            shutdown_min: 10,
            shutdown_confirm_max: 30,
        }
    }
}

impl PhaseTimings {
    /// Hard budget for a phase
    pub fn max_for(&self, kind: PhaseKind) -> u64 {
        match kind {
            PhaseKind::Startup => self.startup_max,
            PhaseKind::Switch => self.switch_max,
            PhaseKind::Shutdown => self.shutdown_max,
            PhaseKind::ShutdownConfirm => self.shutdown_confirm_max,
        }
    }

    /// Earliest tick at which the synced predicate may end a phase
    ///
    /// The confirmation window has no early exit (cancel is a separate
    /// transition), so its minimum equals its maximum.
    pub fn min_for(&self, kind: PhaseKind) -> u64 {
        match kind {
            PhaseKind::Startup => self.startup_min,
            PhaseKind::Switch => self.switch_min,
            PhaseKind::Shutdown => self.shutdown_min,
            PhaseKind::ShutdownConfirm => self.shutdown_confirm_max,
        }
    }
}
