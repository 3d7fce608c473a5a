//! Errors raised while building a rule table from user overrides.

use crate::TallyStatus;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("invalid color for {status}: {color:?} (expected #RRGGBB)")]
    InvalidColor { status: TallyStatus, color: String },

    #[error("empty display text for {status}")]
    EmptyText { status: TallyStatus },
}
