//! Externally supplied phase actions
//!
//! The machine sequences and times; the room configuration decides what
//! actually happens. Startup/switch/shutdown actions fire once on phase
//! entry (route sources, send power commands); the synced predicates run on
//! every phase tick and report whether the phase's goal is met; the wrap-up
//! probe reads device feedback through the facades so the machine can pass
//! `wrapup = true` once every relevant destination is already in its goal
//! state.
//!
//! All hooks run with the machine's lock held and must not call back into
//! the machine. Device I/O belongs in the hooks' own dispatch - fire the
//! command and let polling confirm it, exactly as the facades are designed
//! for.

use crate::state::{Activity, PhaseKind};

/// One-shot actions on entering a startup or switch phase
pub type PhaseActions = Box<dyn FnMut(Activity) + Send>;

/// Per-tick phase predicate: `(tick, wrapup) -> goal met`
///
/// `wrapup` is true once the probe reports every relevant destination
/// already in its goal state. The shutdown predicate also receives the tick
/// so it can force stubborn hardware into low power over the final window
/// (`tick >= max - 5` is a typical room configuration).
pub type SyncedActions = Box<dyn FnMut(u64, bool) -> bool + Send>;

/// One-shot actions with no activity argument (shutdown entry / completion)
pub type CompletionActions = Box<dyn FnMut() + Send>;

/// Device-feedback probe, asked once per phase tick
pub type WrapupProbe = Box<dyn FnMut(PhaseKind) -> bool + Send>;

/// Countdown fan-out: `(phase, remaining_ticks)`, once per panel per tick
pub type CountdownObserver = Box<dyn FnMut(PhaseKind, u64) + Send>;

/// Idle-page request for a panel that has been inactive too long
pub type IdleNotifier = Box<dyn FnMut(&str) + Send>;

/// The full set of externally supplied actions
///
/// Defaults are inert: predicates simply forward `wrapup`, the probe never
/// reports ready, actions do nothing. A room configuration overrides the
/// fields it needs.
pub struct ActivityHooks {
    /// Fired once on entering `Starting`
    pub startup_actions: PhaseActions,
    /// Runs every startup tick
    pub startup_synced: SyncedActions,
    /// Fired once on entering `Switching`
    pub switch_actions: PhaseActions,
    /// Runs every switch tick
    pub switch_synced: SyncedActions,
    /// Fired once on entering `ShuttingDown`
    pub shutdown_actions: CompletionActions,
    /// Runs every shutdown tick
    pub shutdown_synced: SyncedActions,
    /// Fired once when the shutdown phase completes: force-untie every
    /// destination
    pub shutdown_complete: CompletionActions,
    /// Device-feedback probe behind the `wrapup` flag
    pub wrapup_probe: WrapupProbe,
    /// Fired for each panel whose inactivity crosses the idle threshold
    /// while the room is off
    pub on_idle: IdleNotifier,
}

impl Default for ActivityHooks {
    fn default() -> Self {
        Self {
            startup_actions: Box::new(|_| {}),
            startup_synced: Box::new(|_, wrapup| wrapup),
            switch_actions: Box::new(|_| {}),
            switch_synced: Box::new(|_, wrapup| wrapup),
            shutdown_actions: Box::new(|| {}),
            shutdown_synced: Box::new(|_, wrapup| wrapup),
            shutdown_complete: Box::new(|| {}),
            wrapup_probe: Box::new(|_| false),
            on_idle: Box::new(|_| {}),
        }
    }
}

impl std::fmt::Debug for ActivityHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ActivityHooks { .. }")
    }
}
