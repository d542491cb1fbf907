//! The polling clock thread
//!
//! A dedicated thread hosting a current-thread tokio runtime drives the
//! scheduler at a fixed cadence. The thread owns nothing but the interval
//! and a shutdown channel; all scheduling state lives in the
//! [`PollingScheduler`] it ticks.

use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::scheduler::PollingScheduler;

enum ClockCommand {
    Shutdown,
}

/// Handle to a running polling clock
///
/// Shuts the clock down when dropped; [`ClockHandle::shutdown`] does the
/// same explicitly and joins the thread.
pub struct ClockHandle {
    command_tx: mpsc::Sender<ClockCommand>,
    handle: Option<JoinHandle<()>>,
}

/// Spawn the clock thread, ticking the scheduler every `period`
pub fn spawn_clock(scheduler: Arc<PollingScheduler>, period: Duration) -> ClockHandle {
    let (command_tx, command_rx) = mpsc::channel();

    let handle = thread::Builder::new()
        .name("polling-clock".to_string())
        .spawn(move || run_clock(scheduler, period, command_rx))
        .expect("failed to spawn polling clock thread");

    ClockHandle {
        command_tx,
        handle: Some(handle),
    }
}

fn run_clock(scheduler: Arc<PollingScheduler>, period: Duration, command_rx: mpsc::Receiver<ClockCommand>) {
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create runtime for polling clock: {}", e);
            return;
        }
    };

    rt.block_on(async {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first interval tick completes immediately; consume it so the
        // clock's tick 0 never fires an entry.
        interval.tick().await;

        tracing::info!(?period, "polling clock started");
        loop {
            interval.tick().await;
            match command_rx.try_recv() {
                Ok(ClockCommand::Shutdown) | Err(TryRecvError::Disconnected) => {
                    tracing::info!("polling clock stopped");
                    break;
                }
                Err(TryRecvError::Empty) => {}
            }
            scheduler.advance();
        }
    });
}

impl ClockHandle {
    /// Stop the clock and wait for the thread to exit
    pub fn shutdown(mut self) {
        let _ = self.command_tx.send(ClockCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        let _ = self.command_tx.send(ClockCommand::Shutdown);
    }
}

impl std::fmt::Debug for ClockHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockHandle")
            .field("running", &self.handle.is_some())
            .finish()
    }
}
