//! Status Derivation Engine
//!
//! Maps an actionable switcher snapshot to the tally status of one input.
//! Rules are evaluated top to bottom and the first match wins:
//!
//! 1. Fade to black fully engaged: `Off`
//! 2. Transition running with the input on program or preview: `Transition`
//! 3. Input on program, or keyed on air by the first upstream keyer: `Program`
//! 4. Input on preview, or staged in the first upstream keyer for the next
//!    transition: `Preview`
//! 5. Input shown in an enabled supersource box while the supersource output
//!    is on program: `Supersource`
//! 6. Otherwise: `Off`

use crate::snapshot::{ActionableSnapshot, MixEffect};
use crate::{InputId, TallyStatus};

/// Input id most switchers assign to the supersource output.
pub const DEFAULT_SUPERSOURCE_OUTPUT: InputId = InputId(6000);

/// Transition selection values above this include at least one keyer.
const BACKGROUND_ONLY_SELECTION: u32 = 1;

/// Derives the tally status of a single monitored input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Monitor {
    pub input: InputId,
    /// Input id that represents the supersource output being routed
    pub supersource_output: InputId,
}

impl Monitor {
    pub fn new(input: InputId) -> Self {
        Self {
            input,
            supersource_output: DEFAULT_SUPERSOURCE_OUTPUT,
        }
    }

    pub fn with_supersource_output(mut self, output: InputId) -> Self {
        self.supersource_output = output;
        self
    }

    /// Compute the status for this snapshot. Pure; uses no earlier snapshots.
    pub fn derive(&self, snapshot: &ActionableSnapshot<'_>) -> TallyStatus {
        let me = snapshot.mix_effect;

        if me.is_fully_black() {
            return TallyStatus::Off;
        }

        let on_program = me.program_input == Some(self.input);
        let on_preview = me.preview_input == Some(self.input);

        if me.is_in_transition() && (on_program || on_preview) {
            return TallyStatus::Transition;
        }

        if on_program || self.keyed_on_air(me) {
            return TallyStatus::Program;
        }

        if on_preview || self.keyed_for_next_transition(me) {
            return TallyStatus::Preview;
        }

        let routed = snapshot
            .super_source
            .is_some_and(|ss| ss.routes(self.input));
        if routed && me.program_input == Some(self.supersource_output) {
            return TallyStatus::Supersource;
        }

        TallyStatus::Off
    }

    fn keyed_on_air(&self, me: &MixEffect) -> bool {
        me.upstream_keyer(0)
            .is_some_and(|k| k.is_on_air() && k.fill_source == Some(self.input))
    }

    fn keyed_for_next_transition(&self, me: &MixEffect) -> bool {
        me.transition_selection() > BACKGROUND_ONLY_SELECTION
            && me
                .upstream_keyer(0)
                .is_some_and(|k| !k.is_on_air() && k.fill_source == Some(self.input))
    }
}
