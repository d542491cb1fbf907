//! The activity transition state machine
//!
//! Supervises room-wide `Off → Starting → Steady → Switching /
//! ShuttingDown → Off` transitions under soft time budgets. Phases use live
//! device feedback (via the wrap-up probe) to finish early once past their
//! minimum, and always force through at their hard maximum - the machine
//! never blocks indefinitely on a stuck device.
//!
//! The machine is deterministic: every observable effect happens inside
//! [`ActivityMachine::tick`] or one of the transition calls, so tests drive
//! ticks directly while production wires a [`crate::PhaseClockHandle`].

use parking_lot::Mutex;

use crate::hooks::{ActivityHooks, CountdownObserver};
use crate::idle::IdleTracker;
use crate::state::{Activity, PhaseKind, SystemState};
use crate::timings::PhaseTimings;

struct PhaseTimer {
    kind: PhaseKind,
    tick: u64,
}

struct Machine {
    state: SystemState,
    phase: Option<PhaseTimer>,
    timings: PhaseTimings,
    hooks: ActivityHooks,
    observers: Vec<CountdownObserver>,
    idle: IdleTracker,
    // Steady activity to return to if a shutdown confirmation is cancelled.
    resume: Option<Activity>,
}

/// Room-wide activity supervisor
///
/// Process-wide singleton by convention, explicitly constructed and passed
/// (never a global). Transition calls are safe from any thread; rejected
/// transitions are no-ops and return `false`.
pub struct ActivityMachine {
    inner: Mutex<Machine>,
}

impl ActivityMachine {
    /// Create a machine in the `Off` state
    ///
    /// `idle_threshold` is the panel-inactivity budget, in ticks, after
    /// which an off room requests the idle page.
    pub fn new(timings: PhaseTimings, hooks: ActivityHooks, idle_threshold: u64) -> Self {
        Self {
            inner: Mutex::new(Machine {
                state: SystemState::Off,
                phase: None,
                timings,
                hooks,
                observers: Vec::new(),
                idle: IdleTracker::new(idle_threshold),
                resume: None,
            }),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SystemState {
        self.inner.lock().state
    }

    /// The running activity, if the room is in a steady activity state
    pub fn current_activity(&self) -> Option<Activity> {
        self.inner.lock().state.current_activity()
    }

    /// Register a countdown observer (one per touch panel)
    ///
    /// Observers hear `(phase, remaining_ticks)` on every phase tick.
    pub fn add_countdown_observer(&self, observer: CountdownObserver) {
        self.inner.lock().observers.push(observer);
    }

    /// Register a touch panel with the idle tracker
    pub fn register_panel<I: Into<String>>(&self, panel: I) {
        self.inner.lock().idle.register_panel(panel);
    }

    /// Record user activity on a panel, resetting its idle count
    pub fn panel_activity(&self, panel: &str) {
        self.inner.lock().idle.touch(panel);
    }

    /// `Off → Starting(activity)`: begin powering the room up
    ///
    /// Startup actions fire once; the startup phase timer begins. Rejected
    /// (returning `false`) from any other state.
    pub fn system_start(&self, activity: Activity) -> bool {
        let m = &mut *self.inner.lock();
        if m.state != SystemState::Off {
            tracing::debug!(state = %m.state, %activity, "system_start ignored");
            return false;
        }

        tracing::info!(%activity, "startup phase begins");
        m.state = SystemState::Starting(activity);
        m.phase = Some(PhaseTimer {
            kind: PhaseKind::Startup,
            tick: 0,
        });
        (m.hooks.startup_actions)(activity);
        true
    }

    /// `Steady(a) → Switching(activity)`: change activity without a power
    /// cycle
    ///
    /// Rejected outside steady activity states and for the activity already
    /// running.
    pub fn system_switch(&self, activity: Activity) -> bool {
        let m = &mut *self.inner.lock();
        match m.state {
            SystemState::Steady(current) if current != activity => {
                tracing::info!(from = %current, to = %activity, "switch phase begins");
                m.state = SystemState::Switching(activity);
                m.phase = Some(PhaseTimer {
                    kind: PhaseKind::Switch,
                    tick: 0,
                });
                (m.hooks.switch_actions)(activity);
                true
            }
            _ => {
                tracing::debug!(state = %m.state, %activity, "system_switch ignored");
                false
            }
        }
    }

    /// `Steady → ShuttingDown`: begin powering the room down
    ///
    /// Also accepted from `ShutdownConfirming` (the confirmed path).
    pub fn system_shutdown(&self) -> bool {
        let m = &mut *self.inner.lock();
        match m.state {
            SystemState::Steady(_) | SystemState::ShutdownConfirming => {
                Self::enter_shutdown(m);
                true
            }
            _ => {
                tracing::debug!(state = %m.state, "system_shutdown ignored");
                false
            }
        }
    }

    /// `Steady(a) → ShutdownConfirming`: open the confirmation window
    ///
    /// A no-op outside steady activity states - in particular while the
    /// room is already off. The window's timer forces a shutdown on expiry;
    /// [`ActivityMachine::cancel_shutdown`] aborts back to `Steady(a)`.
    pub fn start_shutdown_confirmation(&self) -> bool {
        let m = &mut *self.inner.lock();
        match m.state {
            SystemState::Steady(activity) => {
                tracing::info!(%activity, "shutdown confirmation window opened");
                m.resume = Some(activity);
                m.state = SystemState::ShutdownConfirming;
                m.phase = Some(PhaseTimer {
                    kind: PhaseKind::ShutdownConfirm,
                    tick: 0,
                });
                true
            }
            _ => {
                tracing::debug!(state = %m.state, "start_shutdown_confirmation ignored");
                false
            }
        }
    }

    /// Abort a pending shutdown confirmation, returning to the prior steady
    /// activity
    pub fn cancel_shutdown(&self) -> bool {
        let m = &mut *self.inner.lock();
        if m.state != SystemState::ShutdownConfirming {
            tracing::debug!(state = %m.state, "cancel_shutdown ignored");
            return false;
        }

        let resume = m.resume.take();
        m.phase = None;
        m.state = match resume {
            Some(activity) => SystemState::Steady(activity),
            // Unreachable in practice; fail safe toward off.
            None => SystemState::Off,
        };
        tracing::info!(state = %m.state, "shutdown cancelled");
        true
    }

    /// One phase-timer tick
    ///
    /// Advances the running phase timer (if any), fans the remaining-time
    /// countdown out to every observer, evaluates the phase's completion
    /// rule, and accumulates panel idle time. Steady states tick only the
    /// idle tracker.
    pub fn tick(&self) {
        let m = &mut *self.inner.lock();

        if let Some(phase) = &mut m.phase {
            phase.tick += 1;
            let tick = phase.tick;
            let kind = phase.kind;
            let max = m.timings.max_for(kind);
            let remaining = max.saturating_sub(tick);

            for observer in &mut m.observers {
                observer(kind, remaining);
            }

            match kind {
                PhaseKind::Startup | PhaseKind::Switch => {
                    let wrapup = (m.hooks.wrapup_probe)(kind);
                    let goal_met = match kind {
                        PhaseKind::Startup => (m.hooks.startup_synced)(tick, wrapup),
                        _ => (m.hooks.switch_synced)(tick, wrapup),
                    };
                    let min = m.timings.min_for(kind);
                    if tick >= max || (goal_met && tick > min) {
                        let activity = match m.state {
                            SystemState::Starting(a) | SystemState::Switching(a) => a,
                            // A phase timer only runs in a matching state.
                            _ => unreachable!("phase timer without transition state"),
                        };
                        m.phase = None;
                        m.state = SystemState::Steady(activity);
                        tracing::info!(%activity, tick, "transition phase complete");
                    }
                }
                PhaseKind::Shutdown => {
                    let wrapup = (m.hooks.wrapup_probe)(kind);
                    let goal_met = (m.hooks.shutdown_synced)(tick, wrapup);
                    if tick >= max || (goal_met && tick > m.timings.shutdown_min) {
                        m.phase = None;
                        m.state = SystemState::Off;
                        m.resume = None;
                        (m.hooks.shutdown_complete)();
                        tracing::info!(tick, "shutdown complete, room off");
                    }
                }
                PhaseKind::ShutdownConfirm => {
                    if tick >= max {
                        tracing::info!("confirmation window expired, forcing shutdown");
                        Self::enter_shutdown(m);
                    }
                }
            }
        }

        // Panel inactivity accumulates on the same tick discipline; the
        // idle page is only requested while the room is off.
        let crossed = m.idle.tick(1);
        if m.state == SystemState::Off {
            for panel in crossed {
                tracing::debug!(%panel, "panel idle threshold crossed");
                (m.hooks.on_idle)(&panel);
            }
        }
    }

    fn enter_shutdown(m: &mut Machine) {
        tracing::info!("shutdown phase begins");
        m.state = SystemState::ShuttingDown;
        m.phase = Some(PhaseTimer {
            kind: PhaseKind::Shutdown,
            tick: 0,
        });
        m.resume = None;
        (m.hooks.shutdown_actions)();
    }
}

impl std::fmt::Debug for ActivityMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let m = self.inner.lock();
        f.debug_struct("ActivityMachine")
            .field("state", &m.state)
            .field("phase_running", &m.phase.is_some())
            .finish()
    }
}
