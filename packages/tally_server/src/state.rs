//! Tally State Holder
//!
//! The single shared record read by the polling endpoint. Status, color and
//! text are published together as one immutable [`StatusRecord`] through a
//! watch channel, so a reader can never see a color that belongs to a
//! different status.

use serde::Serialize;
use std::collections::BTreeMap;
use tokio::sync::watch;

use tally_core::{InputId, RuleTable, TallyStatus};

use crate::addresses::HostAddresses;

/// Status together with its rule-table display values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusRecord {
    pub status: TallyStatus,
    pub color: String,
    pub text: String,
}

impl StatusRecord {
    fn from_rules(rules: &RuleTable, status: TallyStatus) -> Self {
        let display = rules.lookup(status);
        Self {
            status,
            color: display.color.clone(),
            text: display.text.clone(),
        }
    }
}

/// Body of `GET /tally`.
#[derive(Clone, Debug, Serialize)]
pub struct TallyReport {
    pub id: InputId,
    pub status: TallyStatus,
    pub color: String,
    pub text: String,
    pub ip: BTreeMap<String, Vec<String>>,
}

pub struct TallyState {
    monitored_input: InputId,
    host_addresses: HostAddresses,
    rules: RuleTable,
    current: watch::Sender<StatusRecord>,
}

impl TallyState {
    /// Starts out `Unknown` until the first actionable snapshot arrives.
    pub fn new(monitored_input: InputId, host_addresses: HostAddresses, rules: RuleTable) -> Self {
        let initial = StatusRecord::from_rules(&rules, TallyStatus::default());
        let (current, _) = watch::channel(initial);
        Self {
            monitored_input,
            host_addresses,
            rules,
            current,
        }
    }

    pub fn status(&self) -> TallyStatus {
        self.current.borrow().status
    }

    /// Replace the current record. Returns true if the status changed.
    pub fn publish(&self, status: TallyStatus) -> bool {
        let record = StatusRecord::from_rules(&self.rules, status);
        let previous = self.current.send_replace(record);
        previous.status != status
    }

    #[cfg(test)]
    pub fn subscribe(&self) -> watch::Receiver<StatusRecord> {
        self.current.subscribe()
    }

    pub fn report(&self) -> TallyReport {
        let record = self.current.borrow().clone();
        TallyReport {
            id: self.monitored_input,
            status: record.status,
            color: record.color,
            text: record.text,
            ip: self
                .host_addresses
                .iter()
                .map(|(name, ips)| (name.clone(), ips.iter().map(|ip| ip.to_string()).collect()))
                .collect(),
        }
    }
}
