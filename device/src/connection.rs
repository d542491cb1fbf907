//! Connection liveness derived from status traffic
//!
//! Liveness is a pure side effect of write traffic: any status write resets
//! the refresh counter and heals the connection, while each missed
//! checkpoint (issued by the polling clock) increments it. A device that
//! never produces state updates ages out after `refresh_limit` missed
//! opportunities. The derived health signal is display-only and never gates
//! set/update calls.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Transport-independent connection state of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// No liveness verdict yet (no checkpoint has expired, no write seen)
    NotConnected,
    /// Status traffic observed recently
    Connected,
    /// Refresh counter exceeded the limit without a write
    Disconnected,
}

/// Display-level health derived from connection status and staleness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Health {
    /// Connected and recently updated
    Fresh,
    /// Connected but quiet, or no verdict yet
    Stale,
    /// Disconnected
    Dead,
}

/// Refresh-counter liveness tracker, one per device
#[derive(Debug)]
pub struct LivenessTracker {
    refresh_counter: u32,
    refresh_limit: u32,
    status: ConnectionStatus,
    last_change: Option<Instant>,
}

impl LivenessTracker {
    /// Track liveness with the given missed-checkpoint limit
    pub fn new(refresh_limit: u32) -> Self {
        Self {
            refresh_counter: 0,
            refresh_limit,
            status: ConnectionStatus::NotConnected,
            last_change: None,
        }
    }

    /// Current connection status
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// When the connection status last changed
    pub fn last_change(&self) -> Option<Instant> {
        self.last_change
    }

    /// Current refresh counter value
    pub fn refresh_counter(&self) -> u32 {
        self.refresh_counter
    }

    /// Record a status write: reset the counter and heal the connection
    ///
    /// Returns the new status when this write caused a transition.
    pub fn record_write(&mut self) -> Option<ConnectionStatus> {
        self.refresh_counter = 0;
        if self.status != ConnectionStatus::Connected {
            self.status = ConnectionStatus::Connected;
            self.last_change = Some(Instant::now());
            Some(ConnectionStatus::Connected)
        } else {
            None
        }
    }

    /// Record a missed connectivity checkpoint
    ///
    /// Past the limit the device flips to `Disconnected` exactly once;
    /// further checkpoints while disconnected report no transition.
    pub fn checkpoint(&mut self) -> Option<ConnectionStatus> {
        self.refresh_counter = self.refresh_counter.saturating_add(1);
        if self.refresh_counter > self.refresh_limit
            && self.status != ConnectionStatus::Disconnected
        {
            self.status = ConnectionStatus::Disconnected;
            self.last_change = Some(Instant::now());
            Some(ConnectionStatus::Disconnected)
        } else {
            None
        }
    }

    /// Derive the display health signal
    ///
    /// Connected devices are `Fresh` until `stale_after` elapses since the
    /// last status transition; disconnected devices are `Dead`; a device
    /// with no verdict yet reads `Stale`.
    pub fn health(&self, stale_after: Duration) -> Health {
        match self.status {
            ConnectionStatus::Disconnected => Health::Dead,
            ConnectionStatus::NotConnected => Health::Stale,
            ConnectionStatus::Connected => match self.last_change {
                Some(at) if at.elapsed() < stale_after => Health::Fresh,
                _ => Health::Stale,
            },
        }
    }
}
