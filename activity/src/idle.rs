//! Per-panel inactivity accumulation
//!
//! Each touch panel accumulates idle ticks; any user activity resets its
//! count to zero. Crossing the threshold is reported once per idle episode
//! so the idle page is requested a single time, not on every subsequent
//! tick. Consulted only while the room is off; no device I/O is involved.

use std::collections::HashMap;

#[derive(Debug, Default)]
struct PanelIdle {
    accumulated: u64,
    reported: bool,
}

/// Inactivity tracker for the room's touch panels
#[derive(Debug)]
pub struct IdleTracker {
    threshold: u64,
    panels: HashMap<String, PanelIdle>,
}

impl IdleTracker {
    /// Track panels against the given idle threshold, in ticks
    pub fn new(threshold: u64) -> Self {
        Self {
            threshold,
            panels: HashMap::new(),
        }
    }

    /// Register a panel (idempotent; does not reset an existing count)
    pub fn register_panel<I: Into<String>>(&mut self, panel: I) {
        self.panels.entry(panel.into()).or_default();
    }

    /// Record user activity on a panel, resetting its count
    pub fn touch(&mut self, panel: &str) {
        if let Some(idle) = self.panels.get_mut(panel) {
            idle.accumulated = 0;
            idle.reported = false;
        }
    }

    /// Accumulated idle ticks for a panel
    pub fn accumulated(&self, panel: &str) -> Option<u64> {
        self.panels.get(panel).map(|idle| idle.accumulated)
    }

    /// Advance every panel by `delta` ticks
    ///
    /// Returns the panels that crossed the threshold during this call and
    /// have not yet been reported for the current idle episode.
    pub fn tick(&mut self, delta: u64) -> Vec<String> {
        let mut crossed = Vec::new();
        for (panel, idle) in &mut self.panels {
            idle.accumulated = idle.accumulated.saturating_add(delta);
            if idle.accumulated > self.threshold && !idle.reported {
                idle.reported = true;
                crossed.push(panel.clone());
            }
        }
        crossed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossing_reports_once() {
        let mut tracker = IdleTracker::new(3);
        tracker.register_panel("panel-a");

        assert!(tracker.tick(3).is_empty()); // at threshold, not past it
        assert_eq!(tracker.tick(1), vec!["panel-a".to_string()]);
        assert!(tracker.tick(1).is_empty()); // already reported
    }

    #[test]
    fn test_touch_starts_new_episode() {
        let mut tracker = IdleTracker::new(2);
        tracker.register_panel("panel-a");

        tracker.tick(5);
        tracker.touch("panel-a");
        assert_eq!(tracker.accumulated("panel-a"), Some(0));

        // Crosses and reports again after the reset.
        assert_eq!(tracker.tick(3), vec!["panel-a".to_string()]);
    }

    #[test]
    fn test_panels_are_independent() {
        let mut tracker = IdleTracker::new(2);
        tracker.register_panel("panel-a");
        tracker.register_panel("panel-b");

        tracker.tick(2);
        tracker.touch("panel-b");

        let crossed = tracker.tick(1);
        assert_eq!(crossed, vec!["panel-a".to_string()]);
    }

    #[test]
    fn test_touch_unknown_panel_is_noop() {
        let mut tracker = IdleTracker::new(2);
        tracker.touch("ghost");
        assert!(tracker.tick(10).is_empty());
    }
}
