//! Bounded poll-worker pool
//!
//! Device updates perform network or serial I/O, so they never run on the
//! clock thread: ticks push jobs onto a bounded queue and a small pool of
//! worker threads drains it. One unresponsive device can occupy at most one
//! worker; a full queue drops the job and the next divisible tick retries.

use std::sync::mpsc::{Receiver, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use roomctl_device::Device;
use status_store::Qualifier;

/// One dispatched poll
pub(crate) struct PollJob {
    pub(crate) device: Arc<Device>,
    pub(crate) command: String,
    pub(crate) qualifier: Qualifier,
}

impl PollJob {
    pub(crate) fn run(self) {
        if let Err(err) = self.device.update(&self.command, &self.qualifier) {
            // Addressing errors here mean a misconfigured polling entry.
            tracing::error!(
                device = %self.device.id(),
                command = %self.command,
                error = %err,
                "polling entry references unsupported command"
            );
        }
    }
}

/// Create the bounded job queue and its worker threads
pub(crate) fn spawn_poll_workers(
    workers: usize,
    queue_depth: usize,
) -> (SyncSender<PollJob>, Vec<JoinHandle<()>>) {
    let (tx, rx) = std::sync::mpsc::sync_channel(queue_depth);
    let rx: Arc<Mutex<Receiver<PollJob>>> = Arc::new(Mutex::new(rx));

    let handles = (0..workers.max(1))
        .map(|index| {
            let rx = Arc::clone(&rx);
            thread::Builder::new()
                .name(format!("poll-worker-{index}"))
                .spawn(move || loop {
                    // Hold the receiver lock only while waiting, not while
                    // the transport call runs.
                    let job = rx.lock().recv();
                    match job {
                        Ok(job) => job.run(),
                        Err(_) => {
                            tracing::debug!("poll queue closed, worker exiting");
                            break;
                        }
                    }
                })
                .expect("failed to spawn poll worker thread")
        })
        .collect();

    (tx, handles)
}
