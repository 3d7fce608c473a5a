//! Tally Core - switcher state model and tally status derivation
//!
//! This crate has no I/O. It turns a parsed switcher state snapshot into the
//! tally status of a single monitored input, and maps that status to the color
//! and text shown on an indicator.
//!
//! # Example
//!
//! ```
//! use tally_core::{InputId, Monitor, RuleTable, SwitcherState, TallyStatus};
//!
//! let state: SwitcherState = serde_json::from_str(
//!     r#"{"video":{"ME":[{"programInput":2,"previewInput":3}]}}"#,
//! ).unwrap();
//!
//! let monitor = Monitor::new(InputId(2));
//! let snapshot = state.actionable().expect("mix-effect data present");
//! let status = monitor.derive(&snapshot);
//!
//! assert_eq!(status, TallyStatus::Program);
//! assert_eq!(RuleTable::default().lookup(status).text, "ON AIR");
//! ```

mod engine;
mod error;
mod input;
pub mod rules;
pub mod snapshot;
mod status;

pub use engine::{DEFAULT_SUPERSOURCE_OUTPUT, Monitor};
pub use error::RuleError;
pub use input::InputId;
pub use rules::{RuleTable, StatusDisplay};
pub use snapshot::{ActionableSnapshot, SwitcherState};
pub use status::TallyStatus;
