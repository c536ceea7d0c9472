//! Widget policy configuration.

use std::time::Duration;

/// Policy knobs for the next-event widget.
///
/// These are fixed choices of the embedding host, not per-call options.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// Restrict selection to events whose status blocks the calendar.
    pub busy_only: bool,
    /// Data age beyond which a refresh asks the delegate for a reload.
    pub stale_after: Duration,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            busy_only: false,
            stale_after: Duration::from_secs(300), // 5 minutes
        }
    }
}

impl WidgetConfig {
    /// Creates a config with default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: restrict selection to busy events.
    pub fn with_busy_only(mut self, busy_only: bool) -> Self {
        self.busy_only = busy_only;
        self
    }

    /// Builder: set the staleness threshold.
    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }
}
