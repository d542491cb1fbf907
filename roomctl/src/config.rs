//! Room configuration records
//!
//! Serde views of the per-room description an installer ships with the
//! system: device identities, their command tables, and their polling
//! lists. Loading and validating the file itself is the caller's job;
//! transport handlers cannot come from data and are attached in driver
//! code via [`DeviceConfig::builder`].

use serde::{Deserialize, Serialize};

use roomctl_activity::PhaseTimings;
use roomctl_device::DeviceBuilder;
use status_store::{CommandSpec, Qualifier};

/// One device's polling declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Command to refresh
    pub command: String,
    /// Qualifier the refresh is addressed with
    #[serde(default)]
    pub qualifier: Qualifier,
    /// Occupied-room period, in clock ticks
    #[serde(default = "scheduler_defaults::active_every")]
    pub active_every: u64,
    /// Empty-room period, in clock ticks
    #[serde(default = "scheduler_defaults::inactive_every")]
    pub inactive_every: u64,
}

/// One device's static description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub model: String,
    /// Missed checkpoints before the device reads disconnected
    #[serde(default = "defaults::refresh_limit")]
    pub refresh_limit: u32,
    /// Commands the device exposes
    #[serde(default)]
    pub commands: Vec<CommandSpec>,
    /// Commands the scheduler refreshes
    #[serde(default)]
    pub polling: Vec<PollingConfig>,
}

impl DeviceConfig {
    /// Start a [`DeviceBuilder`] pre-populated with this record's identity,
    /// liveness limit, and command table
    ///
    /// Driver code attaches the transport handlers and builds.
    pub fn builder(&self) -> DeviceBuilder {
        let mut builder = DeviceBuilder::new(&self.id)
            .name(&self.name)
            .manufacturer(&self.manufacturer)
            .model(&self.model)
            .refresh_limit(self.refresh_limit);
        for spec in &self.commands {
            builder = builder.command(spec.clone());
        }
        builder
    }
}

/// The full room description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    pub name: String,
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
    #[serde(default)]
    pub timings: PhaseTimings,
    /// Panel inactivity budget, in ticks, before an off room requests the
    /// idle page
    #[serde(default = "defaults::idle_threshold")]
    pub idle_threshold: u64,
}

mod defaults {
    pub fn refresh_limit() -> u32 {
        30
    }

    pub fn idle_threshold() -> u64 {
        600
    }
}

mod scheduler_defaults {
    pub fn active_every() -> u64 {
        roomctl_scheduler::DEFAULT_ACTIVE_EVERY
    }

    pub fn inactive_every() -> u64 {
        roomctl_scheduler::DEFAULT_INACTIVE_EVERY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_config_builder_carries_commands() {
        let config = DeviceConfig {
            id: "sw-1".into(),
            name: "Switcher".into(),
            manufacturer: "Acme".into(),
            model: "MX-84".into(),
            refresh_limit: 5,
            commands: vec![CommandSpec::new("Tie", ["Input", "Output"])],
            polling: Vec::new(),
        };

        let device = config.builder().build().unwrap();
        assert_eq!(device.id(), "sw-1");
        assert!(device.has_command("Tie"));
    }

    #[test]
    fn test_room_config_defaults_from_json() {
        let room: RoomConfig = serde_json::from_str(
            r#"{
                "name": "Seminar Room 2.04",
                "devices": [{
                    "id": "disp-1",
                    "name": "Front Display",
                    "commands": [{ "name": "Power" }],
                    "polling": [{ "command": "Power" }]
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(room.idle_threshold, 600);
        assert_eq!(room.timings, PhaseTimings::default());

        let device = &room.devices[0];
        assert_eq!(device.refresh_limit, 30);
        assert_eq!(device.polling[0].active_every, 10);
        assert_eq!(device.polling[0].inactive_every, 60);
        assert!(device.polling[0].qualifier.is_empty());
    }
}
