use proptest::prelude::*;

use tally_core::snapshot::{
    FadeToBlack, MixEffect, SuperSource, SuperSourceBox, TransitionProperties, UpstreamKeyer,
    VideoState,
};
use tally_core::{InputId, Monitor, RuleTable, SwitcherState, TallyStatus};

const CAM: InputId = InputId(2);
const SUPERSOURCE_OUTPUT: InputId = InputId(6000);

// --- Strategies ---

/// Small id space so the monitored input and the supersource output show up often.
fn arb_input() -> impl Strategy<Value = Option<InputId>> {
    prop_oneof![
        Just(None),
        Just(Some(CAM)),
        Just(Some(SUPERSOURCE_OUTPUT)),
        (1u16..6).prop_map(|id| Some(InputId(id))),
    ]
}

fn arb_keyer() -> impl Strategy<Value = Option<UpstreamKeyer>> {
    prop::option::of((prop::option::of(any::<bool>()), arb_input()).prop_map(
        |(on_air, fill_source)| UpstreamKeyer {
            on_air,
            fill_source,
        },
    ))
}

fn arb_super_source() -> impl Strategy<Value = Option<SuperSource>> {
    prop::option::of(
        prop::collection::btree_map(0u16..4, (any::<bool>(), arb_input()), 0..4).prop_map(
            |boxes| SuperSource {
                boxes: boxes
                    .into_iter()
                    .map(|(id, (enabled, source))| (id, SuperSourceBox { enabled, source }))
                    .collect(),
            },
        ),
    )
}

fn arb_mix_effect() -> impl Strategy<Value = MixEffect> {
    (
        arb_input(),
        arb_input(),
        prop::option::of(any::<bool>()),
        prop::option::of(any::<bool>()),
        prop::option::of(0u32..4),
        arb_keyer(),
    )
        .prop_map(
            |(program, preview, in_transition, black, selection, keyer)| MixEffect {
                program_input: program,
                preview_input: preview,
                in_transition,
                fade_to_black: black.map(|b| FadeToBlack {
                    is_fully_black: Some(b),
                }),
                transition_properties: selection.map(|s| TransitionProperties {
                    selection: Some(s),
                }),
                upstream_keyers: vec![keyer],
            },
        )
}

fn arb_state() -> impl Strategy<Value = SwitcherState> {
    (arb_mix_effect(), arb_super_source()).prop_map(|(me, ss)| SwitcherState {
        video: Some(VideoState {
            mix_effects: vec![Some(me)],
            super_sources: vec![ss],
        }),
    })
}

fn monitor() -> Monitor {
    Monitor::new(CAM).with_supersource_output(SUPERSOURCE_OUTPUT)
}

fn fully_black(me: &MixEffect) -> bool {
    me.fade_to_black
        .as_ref()
        .and_then(|f| f.is_fully_black)
        .unwrap_or(false)
}

// --- Engine properties ---

proptest! {
    #[test]
    fn derive_is_deterministic(state in arb_state()) {
        let snapshot = state.actionable().unwrap();
        prop_assert_eq!(monitor().derive(&snapshot), monitor().derive(&snapshot));
    }

    #[test]
    fn never_unknown(state in arb_state()) {
        let snapshot = state.actionable().unwrap();
        prop_assert_ne!(monitor().derive(&snapshot), TallyStatus::Unknown);
    }

    #[test]
    fn transition_wins_when_participating(state in arb_state()) {
        let me = state.actionable().unwrap().mix_effect;
        let participating = me.program_input == Some(CAM) || me.preview_input == Some(CAM);
        if me.in_transition == Some(true) && participating && !fully_black(me) {
            prop_assert_eq!(
                monitor().derive(&state.actionable().unwrap()),
                TallyStatus::Transition
            );
        }
    }

    #[test]
    fn keyer_on_air_is_program(state in arb_state()) {
        let snapshot = state.actionable().unwrap();
        let me = snapshot.mix_effect;
        let keyed = me
            .upstream_keyer(0)
            .is_some_and(|k| k.is_on_air() && k.fill_source == Some(CAM));
        let in_transition = me.is_in_transition()
            && (me.program_input == Some(CAM) || me.preview_input == Some(CAM));
        if keyed && !in_transition && !fully_black(me) {
            prop_assert_eq!(monitor().derive(&snapshot), TallyStatus::Program);
        }
    }

    #[test]
    fn supersource_requires_routing_and_program(state in arb_state()) {
        let snapshot = state.actionable().unwrap();
        if monitor().derive(&snapshot) == TallyStatus::Supersource {
            prop_assert_eq!(snapshot.mix_effect.program_input, Some(SUPERSOURCE_OUTPUT));
            prop_assert!(snapshot.super_source.is_some_and(|ss| ss.routes(CAM)));
        }
    }

    #[test]
    fn fully_black_is_always_off(state in arb_state()) {
        let snapshot = state.actionable().unwrap();
        if fully_black(snapshot.mix_effect) {
            prop_assert_eq!(monitor().derive(&snapshot), TallyStatus::Off);
        }
    }

    #[test]
    fn untouched_input_is_off(state in arb_state()) {
        // An input that appears nowhere in the snapshot can only be off
        let snapshot = state.actionable().unwrap();
        let absent = Monitor::new(InputId(999)).with_supersource_output(SUPERSOURCE_OUTPUT);
        prop_assert_eq!(absent.derive(&snapshot), TallyStatus::Off);
    }

    #[test]
    fn snapshot_json_roundtrip_preserves_status(state in arb_state()) {
        let json = serde_json::to_string(&state).unwrap();
        let reparsed: SwitcherState = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(
            monitor().derive(&state.actionable().unwrap()),
            monitor().derive(&reparsed.actionable().unwrap())
        );
    }
}

// --- Example scenarios (monitored input 2, supersource output 6000) ---

fn parse(json: &str) -> SwitcherState {
    serde_json::from_str(json).unwrap()
}

fn status_of(json: &str) -> Option<TallyStatus> {
    let state = parse(json);
    state.actionable().map(|s| monitor().derive(&s))
}

#[test]
fn scenario_program() {
    assert_eq!(
        status_of(r#"{"video":{"ME":[{"programInput":2,"previewInput":3,"inTransition":false}]}}"#),
        Some(TallyStatus::Program)
    );
}

#[test]
fn scenario_transition() {
    assert_eq!(
        status_of(r#"{"video":{"ME":[{"programInput":1,"previewInput":2,"inTransition":true}]}}"#),
        Some(TallyStatus::Transition)
    );
}

#[test]
fn scenario_keyed_program() {
    assert_eq!(
        status_of(
            r#"{"video":{"ME":[{"programInput":1,"previewInput":3,
                "upstreamKeyers":[{"onAir":true,"fillSource":2}]}]}}"#
        ),
        Some(TallyStatus::Program)
    );
}

#[test]
fn scenario_supersource() {
    assert_eq!(
        status_of(
            r#"{"video":{"ME":[{"programInput":6000,"previewInput":1}],
                "superSources":[{"boxes":{"0":{"enabled":true,"source":2}}}]}}"#
        ),
        Some(TallyStatus::Supersource)
    );
}

#[test]
fn scenario_off() {
    assert_eq!(
        status_of(r#"{"video":{"ME":[{"programInput":1,"previewInput":3}]}}"#),
        Some(TallyStatus::Off)
    );
}

#[test]
fn scenario_missing_mix_effect_is_not_evaluated() {
    assert_eq!(status_of(r#"{"video":{"superSources":[]}}"#), None);
}

#[test]
fn scenario_null_fields_read_as_absent() {
    assert_eq!(
        status_of(r#"{"video":{"ME":[{"programInput":2,"upstreamKeyers":null}],"superSources":null}}"#),
        Some(TallyStatus::Program)
    );
    assert_eq!(status_of(r#"{"video":{"ME":null}}"#), None);
}

#[test]
fn every_status_has_rule_table_entry() {
    let rules = RuleTable::default();
    for status in TallyStatus::ALL {
        assert!(rules.lookup(status).color.starts_with('#'));
    }
}
