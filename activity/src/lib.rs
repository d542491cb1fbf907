//! Activity transition state machine for room automation
//!
//! Coordinates room-wide power and mode changes across an arbitrary set of
//! AV destinations: `Off → Starting → {share, adv_share, group_work} →
//! Switching / ShuttingDown → Off`, each transition supervised by a phase
//! timer with a hard budget and an optional early-exit minimum. Live device
//! feedback (through the wrap-up probe) lets a phase finish as soon as every
//! destination reports its goal state; hardware that never reports is
//! escaped only by the timeout, so the machine never hangs on a stuck
//! device.
//!
//! ```rust
//! use roomctl_activity::{Activity, ActivityHooks, ActivityMachine, PhaseTimings, SystemState};
//!
//! let machine = ActivityMachine::new(PhaseTimings::default(), ActivityHooks::default(), 600);
//!
//! machine.system_start(Activity::Share);
//! assert_eq!(machine.state(), SystemState::Starting(Activity::Share));
//!
//! // The 1 Hz phase clock (or a test) drives ticks:
//! for _ in 0..90 {
//!     machine.tick();
//! }
//! assert_eq!(machine.state(), SystemState::Steady(Activity::Share));
//! ```

pub mod clock;
pub mod hooks;
pub mod idle;
pub mod machine;
pub mod state;
pub mod timings;

pub use clock::{spawn_phase_clock, PhaseClockHandle};
pub use hooks::{
    ActivityHooks, CompletionActions, CountdownObserver, IdleNotifier, PhaseActions,
    SyncedActions, WrapupProbe,
};
pub use idle::IdleTracker;
pub use machine::ActivityMachine;
pub use state::{Activity, PhaseKind, SystemState};
pub use timings::PhaseTimings;
