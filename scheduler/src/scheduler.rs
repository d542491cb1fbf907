//! The polling scheduler
//!
//! A process-wide registry of (device, command, qualifier) entries, each
//! with an occupied-room and an empty-room refresh period. One shared
//! monotonic tick counter drives every entry: on tick `t`, an entry whose
//! current-mode period `d` satisfies `t % d == 0` is dispatched. Ticks
//! start at 1, so over `N` ticks an entry fires exactly `⌊N/d⌋` times and
//! relative phase between entries is deterministic.

use std::collections::HashMap;
use std::sync::mpsc::{SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use roomctl_device::DeviceRegistry;
use status_store::StatusCallback;

use crate::entry::{PollingEntry, PollingMode};
use crate::error::{Result, SchedulerError};
use crate::worker::{spawn_poll_workers, PollJob};

/// Worker pool sizing
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Poll worker threads. Zero runs polls inline on the ticking thread,
    /// only for tests and transports known not to block, since it couples
    /// tick delivery to device I/O.
    pub workers: usize,
    /// Bounded job queue depth; a full queue skips the poll until the next
    /// divisible tick
    pub queue_depth: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_depth: 64,
        }
    }
}

struct SchedulerState {
    entries: HashMap<(String, String), PollingEntry>,
    mode: PollingMode,
    tick: u64,
}

/// Divisor-clock polling scheduler
///
/// Sync API; a [`crate::ClockHandle`] thread calls [`PollingScheduler::advance`]
/// once per second in production, and tests drive it directly for
/// deterministic tick counts.
pub struct PollingScheduler {
    registry: Arc<DeviceRegistry>,
    state: Mutex<SchedulerState>,
    jobs: Option<SyncSender<PollJob>>,
    _workers: Vec<JoinHandle<()>>,
}

impl PollingScheduler {
    /// Create a scheduler over the given device registry
    ///
    /// The registry is consulted every tick for liveness checkpoints, so
    /// devices with no polling configured still age out.
    pub fn new(registry: Arc<DeviceRegistry>, config: SchedulerConfig) -> Self {
        let (jobs, workers) = if config.workers == 0 {
            (None, Vec::new())
        } else {
            let (tx, handles) = spawn_poll_workers(config.workers, config.queue_depth);
            (Some(tx), handles)
        };
        Self {
            registry,
            state: Mutex::new(SchedulerState {
                entries: HashMap::new(),
                mode: PollingMode::Active,
                tick: 0,
            }),
            jobs,
            _workers: workers,
        }
    }

    /// Add a polling entry, replacing any entry for the same
    /// `(device, command)` pair
    pub fn add(&self, entry: PollingEntry) {
        let key = entry.key();
        let mut state = self.state.lock();
        if state.entries.insert(key, entry).is_some() {
            tracing::debug!("polling entry replaced");
        }
    }

    /// Add a polling entry and subscribe the supplied callback to the same
    /// command + qualifier, so operators declare the pair once
    pub fn add_with_callback(&self, entry: PollingEntry, callback: StatusCallback) -> Result<()> {
        entry
            .device
            .subscribe_status(&entry.command, &entry.qualifier, callback)?;
        self.add(entry);
        Ok(())
    }

    /// Remove the entry for a `(device, command)` pair
    pub fn remove(&self, device_id: &str, command: &str) -> bool {
        self.state
            .lock()
            .entries
            .remove(&(device_id.to_string(), command.to_string()))
            .is_some()
    }

    /// Number of registered entries
    pub fn entry_count(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Current clock mode
    pub fn mode(&self) -> PollingMode {
        self.state.lock().mode
    }

    /// Current tick count of the running clock
    pub fn tick_count(&self) -> u64 {
        self.state.lock().tick
    }

    /// Switch between the occupied-room and empty-room clocks
    ///
    /// Switching stops one clock and restarts the other from tick zero;
    /// setting the current mode again is a no-op.
    pub fn set_mode(&self, mode: PollingMode) {
        let mut state = self.state.lock();
        if state.mode != mode {
            tracing::info!(?mode, "polling mode changed, clock restarted");
            state.mode = mode;
            state.tick = 0;
        }
    }

    /// One clock tick
    ///
    /// Dispatches every due entry to the worker pool and issues one
    /// liveness checkpoint per registered device. Never blocks on device
    /// I/O.
    pub fn advance(&self) {
        let due: Vec<PollJob> = {
            let mut state = self.state.lock();
            state.tick += 1;
            let tick = state.tick;
            let mode = state.mode;
            state
                .entries
                .values()
                .filter(|entry| tick % entry.period(mode) == 0)
                .map(|entry| PollJob {
                    device: Arc::clone(&entry.device),
                    command: entry.command.clone(),
                    qualifier: entry.qualifier.clone(),
                })
                .collect()
        };

        for job in due {
            self.dispatch(job);
        }

        for device in self.registry.devices() {
            device.liveness_checkpoint();
        }
    }

    /// Immediate unconditional pass over every entry
    ///
    /// Runs the updates inline on the calling thread, regardless of clock
    /// state or tick position. Used once at startup to seed every status
    /// store before the first UI render, so callers can rely on completion
    /// when this returns.
    pub fn poll_everything(&self) {
        let all: Vec<PollJob> = {
            let state = self.state.lock();
            state
                .entries
                .values()
                .map(|entry| PollJob {
                    device: Arc::clone(&entry.device),
                    command: entry.command.clone(),
                    qualifier: entry.qualifier.clone(),
                })
                .collect()
        };

        tracing::info!(entries = all.len(), "seeding status stores");
        for job in all {
            job.run();
        }
    }

    fn dispatch(&self, job: PollJob) {
        let jobs = match &self.jobs {
            Some(jobs) => jobs,
            None => return job.run(),
        };
        match jobs.try_send(job) {
            Ok(()) => {}
            Err(TrySendError::Full(job)) => {
                tracing::warn!(
                    device = %job.device.id(),
                    command = %job.command,
                    "poll queue full, skipping until next divisible tick"
                );
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::error!("{}", SchedulerError::WorkerPoolDown);
            }
        }
    }
}

impl std::fmt::Debug for PollingScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PollingScheduler")
            .field("entries", &state.entries.len())
            .field("mode", &state.mode)
            .field("tick", &state.tick)
            .finish()
    }
}
