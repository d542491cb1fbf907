//! Polling scheduler for room-automation devices
//!
//! Keeps every device's status fresh without devices knowing about each
//! other: a process-wide registry of polling entries, two mutually
//! exclusive coarse clocks (occupied room / empty room), and divisor-based
//! firing off one shared tick counter - O(entries) work per tick of a
//! single clock instead of one timer per entry.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use roomctl_scheduler::{spawn_clock, PollingEntry, PollingMode, PollingScheduler, SchedulerConfig};
//!
//! let scheduler = Arc::new(PollingScheduler::new(registry, SchedulerConfig::default()));
//!
//! scheduler.add(
//!     PollingEntry::new(switcher, "InputTieStatus", qualifier)
//!         .active_every(5)
//!         .inactive_every(120),
//! );
//!
//! scheduler.poll_everything(); // seed stores before the first render
//! let clock = spawn_clock(Arc::clone(&scheduler), Duration::from_secs(1));
//!
//! // Occupancy sensor fires:
//! scheduler.set_mode(PollingMode::Inactive);
//! ```

pub mod clock;
pub mod entry;
pub mod error;
pub mod scheduler;
mod worker;

pub use clock::{spawn_clock, ClockHandle};
pub use entry::{PollingEntry, PollingMode, DEFAULT_ACTIVE_EVERY, DEFAULT_INACTIVE_EVERY};
pub use error::{Result, SchedulerError};
pub use scheduler::{PollingScheduler, SchedulerConfig};

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use roomctl_device::{ConnectionStatus, Device, DeviceBuilder, DeviceRegistry};
    use status_store::{CommandSpec, Qualifier};

    use super::*;

    fn counting_device(id: &str, polls: Arc<AtomicUsize>) -> Arc<Device> {
        DeviceBuilder::new(id)
            .refresh_limit(1000)
            .command(CommandSpec::scalar("Power"))
            .on_update("Power", move |device, qualifier| {
                polls.fetch_add(1, Ordering::SeqCst);
                device.write_status("Power", true, qualifier)?;
                Ok(())
            })
            .build()
            .unwrap()
    }

    fn inline_scheduler(registry: Arc<DeviceRegistry>) -> PollingScheduler {
        // workers = 0 keeps every poll on the test thread.
        PollingScheduler::new(
            registry,
            SchedulerConfig {
                workers: 0,
                queue_depth: 16,
            },
        )
    }

    #[test]
    fn test_divisor_law() {
        let registry = Arc::new(DeviceRegistry::new());
        let polls = Arc::new(AtomicUsize::new(0));
        let device = counting_device("d1", Arc::clone(&polls));
        registry.add(Arc::clone(&device));

        let scheduler = inline_scheduler(registry);
        scheduler.add(PollingEntry::new(device, "Power", Qualifier::new()).active_every(3));

        // Tick 0 never fires; over N ticks an entry with period d fires
        // exactly floor(N/d) times.
        for _ in 0..10 {
            scheduler.advance();
        }
        assert_eq!(polls.load(Ordering::SeqCst), 10 / 3);
    }

    #[test]
    fn test_mode_switch_restarts_clock() {
        let registry = Arc::new(DeviceRegistry::new());
        let polls = Arc::new(AtomicUsize::new(0));
        let device = counting_device("d1", Arc::clone(&polls));
        registry.add(Arc::clone(&device));

        let scheduler = inline_scheduler(registry);
        scheduler.add(
            PollingEntry::new(device, "Power", Qualifier::new())
                .active_every(2)
                .inactive_every(4),
        );

        scheduler.advance();
        scheduler.advance(); // active tick 2: fires
        assert_eq!(polls.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.tick_count(), 2);

        scheduler.set_mode(PollingMode::Inactive);
        assert_eq!(scheduler.tick_count(), 0);

        // Inactive period is 4: three ticks fire nothing...
        for _ in 0..3 {
            scheduler.advance();
        }
        assert_eq!(polls.load(Ordering::SeqCst), 1);
        // ...the fourth fires.
        scheduler.advance();
        assert_eq!(polls.load(Ordering::SeqCst), 2);

        // Re-setting the current mode is a no-op.
        scheduler.set_mode(PollingMode::Inactive);
        assert_eq!(scheduler.tick_count(), 4);
    }

    #[test]
    fn test_poll_everything_ignores_clock_position() {
        let registry = Arc::new(DeviceRegistry::new());
        let polls = Arc::new(AtomicUsize::new(0));
        let device = counting_device("d1", Arc::clone(&polls));
        registry.add(Arc::clone(&device));

        let scheduler = inline_scheduler(registry);
        scheduler.add(PollingEntry::new(device, "Power", Qualifier::new()).active_every(100));

        scheduler.poll_everything();
        assert_eq!(polls.load(Ordering::SeqCst), 1);
        // The seed pass does not consume clock ticks.
        assert_eq!(scheduler.tick_count(), 0);
    }

    #[test]
    fn test_duplicate_entry_replaces() {
        let registry = Arc::new(DeviceRegistry::new());
        let polls = Arc::new(AtomicUsize::new(0));
        let device = counting_device("d1", Arc::clone(&polls));
        registry.add(Arc::clone(&device));

        let scheduler = inline_scheduler(registry);
        scheduler.add(PollingEntry::new(Arc::clone(&device), "Power", Qualifier::new()).active_every(1));
        scheduler.add(PollingEntry::new(device, "Power", Qualifier::new()).active_every(5));
        assert_eq!(scheduler.entry_count(), 1);

        // Only the replacement period applies.
        for _ in 0..4 {
            scheduler.advance();
        }
        assert_eq!(polls.load(Ordering::SeqCst), 0);
        scheduler.advance();
        assert_eq!(polls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_add_with_callback_subscribes_once() {
        let registry = Arc::new(DeviceRegistry::new());
        let polls = Arc::new(AtomicUsize::new(0));
        let device = counting_device("d1", Arc::clone(&polls));
        registry.add(Arc::clone(&device));

        let scheduler = inline_scheduler(registry);
        let notified = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notified);

        scheduler
            .add_with_callback(
                PollingEntry::new(device, "Power", Qualifier::new()).active_every(1),
                Arc::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        // The handler writes `true` every poll; only the first write is a
        // change, so the callback hears exactly one update.
        for _ in 0..3 {
            scheduler.advance();
        }
        assert_eq!(polls.load(Ordering::SeqCst), 3);
        assert_eq!(notified.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_ticks_issue_liveness_checkpoints() {
        let registry = Arc::new(DeviceRegistry::new());
        // No polling configured for this device at all.
        let silent = DeviceBuilder::new("mic-1")
            .refresh_limit(2)
            .command(CommandSpec::scalar("Mute"))
            .build()
            .unwrap();
        registry.add(Arc::clone(&silent));

        let scheduler = inline_scheduler(registry);
        for _ in 0..3 {
            scheduler.advance();
        }
        assert_eq!(silent.connection_status(), ConnectionStatus::Disconnected);
    }
}
