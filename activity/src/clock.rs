//! The phase clock thread
//!
//! Drives [`ActivityMachine::tick`] at a fixed cadence (one second in
//! production). The machine no-ops when no phase is running, so the clock
//! runs for the process lifetime; phase timers start and stop purely as
//! machine state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::machine::ActivityMachine;

/// Handle to a running phase clock; stops it when dropped
pub struct PhaseClockHandle {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

/// Spawn the phase clock, ticking the machine every `period`
pub fn spawn_phase_clock(machine: Arc<ActivityMachine>, period: Duration) -> PhaseClockHandle {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);

    let handle = thread::Builder::new()
        .name("phase-clock".to_string())
        .spawn(move || {
            tracing::info!(?period, "phase clock started");
            while !stop_flag.load(Ordering::Relaxed) {
                thread::sleep(period);
                if stop_flag.load(Ordering::Relaxed) {
                    break;
                }
                machine.tick();
            }
            tracing::info!("phase clock stopped");
        })
        .expect("failed to spawn phase clock thread");

    PhaseClockHandle {
        stop,
        handle: Some(handle),
    }
}

impl PhaseClockHandle {
    /// Stop the clock and wait for the thread to exit
    pub fn shutdown(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PhaseClockHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for PhaseClockHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseClockHandle")
            .field("running", &self.handle.is_some())
            .finish()
    }
}
