use serde::{Deserialize, Serialize};
use std::fmt;

/// Tally status of the monitored input.
///
/// The engine produces every variant except `Unknown`, which is the status
/// before any usable snapshot has arrived (and optionally after the switcher
/// connection is lost).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TallyStatus {
    Program,
    Preview,
    Transition,
    Supersource,
    Off,
    #[default]
    Unknown,
}

impl TallyStatus {
    pub const ALL: [TallyStatus; 6] = [
        TallyStatus::Program,
        TallyStatus::Preview,
        TallyStatus::Transition,
        TallyStatus::Supersource,
        TallyStatus::Off,
        TallyStatus::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TallyStatus::Program => "program",
            TallyStatus::Preview => "preview",
            TallyStatus::Transition => "transition",
            TallyStatus::Supersource => "supersource",
            TallyStatus::Off => "off",
            TallyStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TallyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
