//! Status rule table: what an indicator shows for each tally status.

use serde::{Deserialize, Serialize};

use crate::{RuleError, TallyStatus};

/// Color and label shown for one status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDisplay {
    /// Hex RGB, e.g. `#FF0000`
    pub color: String,
    pub text: String,
}

impl StatusDisplay {
    fn new(color: &str, text: &str) -> Self {
        Self {
            color: color.to_string(),
            text: text.to_string(),
        }
    }
}

/// Lookup table from status to display values.
///
/// Every status always has an entry, so lookups cannot fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleTable {
    program: StatusDisplay,
    preview: StatusDisplay,
    transition: StatusDisplay,
    supersource: StatusDisplay,
    off: StatusDisplay,
    unknown: StatusDisplay,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self {
            program: StatusDisplay::new("#FF0000", "ON AIR"),
            preview: StatusDisplay::new("#00FF00", "UP NEXT"),
            transition: StatusDisplay::new("#FFFF00", "IN TRANSITION"),
            supersource: StatusDisplay::new("#FF8000", "ON AIR (SUPERSOURCE)"),
            off: StatusDisplay::new("#666666", "NOT SELECTED"),
            unknown: StatusDisplay::new("#0000FF", "NO SWITCHER DATA"),
        }
    }
}

impl RuleTable {
    pub fn lookup(&self, status: TallyStatus) -> &StatusDisplay {
        match status {
            TallyStatus::Program => &self.program,
            TallyStatus::Preview => &self.preview,
            TallyStatus::Transition => &self.transition,
            TallyStatus::Supersource => &self.supersource,
            TallyStatus::Off => &self.off,
            TallyStatus::Unknown => &self.unknown,
        }
    }

    fn entry_mut(&mut self, status: TallyStatus) -> &mut StatusDisplay {
        match status {
            TallyStatus::Program => &mut self.program,
            TallyStatus::Preview => &mut self.preview,
            TallyStatus::Transition => &mut self.transition,
            TallyStatus::Supersource => &mut self.supersource,
            TallyStatus::Off => &mut self.off,
            TallyStatus::Unknown => &mut self.unknown,
        }
    }

    /// Replace the color and/or text of one status.
    ///
    /// Colors are normalized to upper case. Fields left as `None` keep their
    /// current value.
    pub fn with_override(
        mut self,
        status: TallyStatus,
        color: Option<&str>,
        text: Option<&str>,
    ) -> Result<Self, RuleError> {
        if let Some(color) = color {
            if !is_hex_color(color) {
                return Err(RuleError::InvalidColor {
                    status,
                    color: color.to_string(),
                });
            }
            self.entry_mut(status).color = color.to_ascii_uppercase();
        }

        if let Some(text) = text {
            let text = text.trim();
            if text.is_empty() {
                return Err(RuleError::EmptyText { status });
            }
            self.entry_mut(status).text = text.to_string();
        }

        Ok(self)
    }
}

fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
