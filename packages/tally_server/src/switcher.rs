//! Switcher event feed
//!
//! The switcher connection itself lives outside this service. Whatever bridge
//! talks to the switcher writes one JSON event per line:
//!
//! ```text
//! {"type":"connected"}
//! {"type":"stateChanged","state":{"video":{"ME":[{"programInput":1,"previewInput":2}]}}}
//! {"type":"disconnected"}
//! ```
//!
//! Lines are decoded into [`SwitcherEvent`]s and forwarded over a channel to
//! the snapshot listener.

use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::sync::Arc;
use std::thread;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use tally_core::SwitcherState;

use crate::metrics::ListenerStats;

/// Event delivered by the switcher connection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SwitcherEvent {
    Connected,
    Disconnected,
    StateChanged { state: Box<SwitcherState> },
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("failed to read switcher feed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid event on line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Decode one feed line. Blank lines yield `Ok(None)`.
pub fn decode_line(line_no: usize, line: &str) -> Result<Option<SwitcherEvent>, FeedError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|source| FeedError::Decode {
            line: line_no,
            source,
        })
}

/// Decode a line, logging and counting failures instead of returning them.
fn decode_or_skip(line_no: usize, line: &str, stats: &ListenerStats) -> Option<SwitcherEvent> {
    match decode_line(line_no, line) {
        Ok(event) => event,
        Err(e) => {
            stats.feed_error();
            warn!("Skipping switcher feed line: {}", e);
            None
        }
    }
}

/// Pump events from a line-delimited reader into `tx` until EOF.
///
/// Undecodable lines are logged and skipped. Returns the number of events
/// forwarded; stops early if the receiving side has gone away.
pub async fn pump_events<R>(
    reader: R,
    tx: mpsc::Sender<SwitcherEvent>,
    stats: Arc<ListenerStats>,
) -> Result<usize, FeedError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_no = 0;
    let mut forwarded = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let Some(event) = decode_or_skip(line_no, &line, &stats) else {
            continue;
        };

        if tx.send(event).await.is_err() {
            debug!("Snapshot listener gone, stopping feed");
            break;
        }
        forwarded += 1;
    }

    info!("Switcher feed ended after {} events", forwarded);
    Ok(forwarded)
}

/// Blocking twin of [`pump_events`] for readers that cannot be cancelled.
///
/// Must run outside the async runtime.
pub fn pump_events_blocking<R>(
    reader: R,
    tx: mpsc::Sender<SwitcherEvent>,
    stats: Arc<ListenerStats>,
) -> Result<usize, FeedError>
where
    R: BufRead,
{
    let mut forwarded = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let Some(event) = decode_or_skip(index + 1, &line, &stats) else {
            continue;
        };

        if tx.blocking_send(event).is_err() {
            debug!("Snapshot listener gone, stopping feed");
            break;
        }
        forwarded += 1;
    }

    info!("Switcher feed ended after {} events", forwarded);
    Ok(forwarded)
}

/// Read stdin on its own OS thread.
///
/// A blocked stdin read cannot be cancelled, so it must not live on the
/// runtime: the thread is simply left behind when the process exits.
pub fn spawn_stdin_feed(
    tx: mpsc::Sender<SwitcherEvent>,
    stats: Arc<ListenerStats>,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("stdin-feed".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            if let Err(e) = pump_events_blocking(stdin.lock(), tx, stats) {
                warn!("Switcher feed failed: {}", e);
            }
        })
}
