//! Snapshot Change Listener
//!
//! Sole writer of the tally state. Events arrive one at a time over an mpsc
//! channel; each actionable snapshot is run through the derivation engine and
//! the result is published to the [`TallyState`].

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use tally_core::{Monitor, SwitcherState, TallyStatus};

use crate::metrics::ListenerStats;
use crate::state::TallyState;
use crate::switcher::SwitcherEvent;

#[derive(Clone, Debug)]
pub struct ListenerConfig {
    pub monitor: Monitor,
    /// Publish `Unknown` when the switcher disconnects instead of keeping the
    /// last status
    pub unknown_on_disconnect: bool,
}

pub struct SnapshotListener {
    config: ListenerConfig,
    state: Arc<TallyState>,
    stats: Arc<ListenerStats>,
}

impl SnapshotListener {
    pub fn new(config: ListenerConfig, state: Arc<TallyState>, stats: Arc<ListenerStats>) -> Self {
        Self {
            config,
            state,
            stats,
        }
    }

    /// Handle a single event. Returns the newly published status, if any.
    pub fn handle_event(&self, event: SwitcherEvent) -> Option<TallyStatus> {
        match event {
            SwitcherEvent::Connected => {
                info!("Connected to switcher");
                self.stats.set_connected(true);
                None
            }
            SwitcherEvent::Disconnected => {
                warn!("Lost connection to switcher");
                self.stats.set_connected(false);
                if self.config.unknown_on_disconnect {
                    self.publish(TallyStatus::Unknown);
                    Some(TallyStatus::Unknown)
                } else {
                    None
                }
            }
            SwitcherEvent::StateChanged { state } => self.handle_snapshot(&state),
        }
    }

    fn handle_snapshot(&self, snapshot: &SwitcherState) -> Option<TallyStatus> {
        self.stats.snapshot_received();

        // Partial updates during resync carry no mix-effect data
        let Some(actionable) = snapshot.actionable() else {
            debug!("Ignoring snapshot without mix-effect data");
            self.stats.snapshot_ignored();
            return None;
        };

        let status = self.config.monitor.derive(&actionable);
        self.publish(status);
        Some(status)
    }

    fn publish(&self, status: TallyStatus) {
        let previous = self.state.status();
        if self.state.publish(status) {
            self.stats.status_changed();
            info!(
                input = %self.config.monitor.input,
                "Tally status: {} -> {}",
                previous,
                status
            );
        } else {
            debug!(input = %self.config.monitor.input, "Tally status unchanged: {}", status);
        }
    }

    /// Process events until every sender has been dropped.
    pub async fn run(self, mut rx: mpsc::Receiver<SwitcherEvent>) {
        while let Some(event) = rx.recv().await {
            self.handle_event(event);
        }
        debug!("Switcher event channel closed");
    }
}

/// Spawn the listener task and return the sender side of its channel.
pub fn spawn_listener(
    listener: SnapshotListener,
    capacity: usize,
) -> (mpsc::Sender<SwitcherEvent>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity);
    let handle = tokio::spawn(listener.run(rx));
    (tx, handle)
}
