//! Device registry
//!
//! Process-wide lookup from device id to facade, shared between the UI
//! layer, the polling scheduler, and the activity hooks.

use std::sync::Arc;

use dashmap::DashMap;

use crate::device::Device;

/// Concurrent id → device map
#[derive(Default)]
pub struct DeviceRegistry {
    devices: DashMap<String, Arc<Device>>,
}

impl DeviceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a device
    pub fn add(&self, device: Arc<Device>) {
        tracing::debug!(device = %device.id(), name = %device.name(), "device registered");
        self.devices.insert(device.id().to_string(), device);
    }

    /// Look up a device by id
    pub fn get(&self, id: &str) -> Option<Arc<Device>> {
        self.devices.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Whether a device id is registered
    pub fn contains(&self, id: &str) -> bool {
        self.devices.contains_key(id)
    }

    /// All registered devices, in no particular order
    pub fn devices(&self) -> Vec<Arc<Device>> {
        self.devices
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// All registered ids
    pub fn ids(&self) -> Vec<String> {
        self.devices.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of registered devices
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl std::fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("device_count", &self.devices.len())
            .finish()
    }
}
