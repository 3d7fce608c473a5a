//! Listener statistics for observability
//!
//! Counters are written by the snapshot listener and read by `/health`.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

#[derive(Debug)]
pub struct ListenerStats {
    /// Whether the switcher connection last reported connected
    pub switcher_connected: AtomicBool,
    /// State-change events received
    pub snapshots_received: AtomicU64,
    /// Snapshots discarded for lacking mix-effect data
    pub snapshots_ignored: AtomicU64,
    /// Published statuses that differed from the previous one
    pub status_changes: AtomicU64,
    /// Feed lines that could not be decoded
    pub feed_errors: AtomicU64,

    start_time: Instant,
}

impl Default for ListenerStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerStats {
    pub fn new() -> Self {
        Self {
            switcher_connected: AtomicBool::new(false),
            snapshots_received: AtomicU64::new(0),
            snapshots_ignored: AtomicU64::new(0),
            status_changes: AtomicU64::new(0),
            feed_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.switcher_connected.store(connected, Ordering::Relaxed);
    }

    pub fn snapshot_received(&self) {
        self.snapshots_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot_ignored(&self) {
        self.snapshots_ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn status_changed(&self) {
        self.status_changes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn feed_error(&self) {
        self.feed_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn snapshot(&self) -> HealthStatus {
        let connected = self.switcher_connected.load(Ordering::Relaxed);
        HealthStatus {
            status: if connected { "healthy" } else { "degraded" }.to_string(),
            switcher_connected: connected,
            snapshots_received: self.snapshots_received.load(Ordering::Relaxed),
            snapshots_ignored: self.snapshots_ignored.load(Ordering::Relaxed),
            status_changes: self.status_changes.load(Ordering::Relaxed),
            feed_errors: self.feed_errors.load(Ordering::Relaxed),
            uptime_secs: self.uptime_secs(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub switcher_connected: bool,
    pub snapshots_received: u64,
    pub snapshots_ignored: u64,
    pub status_changes: u64,
    pub feed_errors: u64,
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stats_are_zero_and_degraded() {
        let health = ListenerStats::new().snapshot();
        assert_eq!(health.status, "degraded");
        assert!(!health.switcher_connected);
        assert_eq!(health.snapshots_received, 0);
        assert_eq!(health.snapshots_ignored, 0);
        assert_eq!(health.status_changes, 0);
        assert_eq!(health.feed_errors, 0);
    }

    #[test]
    fn test_counters() {
        let stats = ListenerStats::new();
        stats.set_connected(true);
        stats.snapshot_received();
        stats.snapshot_received();
        stats.snapshot_ignored();
        stats.status_changed();
        stats.feed_error();

        let health = stats.snapshot();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.snapshots_received, 2);
        assert_eq!(health.snapshots_ignored, 1);
        assert_eq!(health.status_changes, 1);
        assert_eq!(health.feed_errors, 1);
    }
}
