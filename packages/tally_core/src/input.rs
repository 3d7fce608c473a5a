use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a switcher input (camera, media player, supersource output, ...).
///
/// Opaque: only ever compared for exact equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputId(pub u16);

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
