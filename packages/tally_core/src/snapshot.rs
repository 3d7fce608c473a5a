//! Switcher state snapshot model.
//!
//! Mirrors the JSON state tree published by the switcher connection. Every
//! field is optional because partial updates are normal while the connection
//! resynchronizes. Arrays may contain `null` holes for unpopulated slots.

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::InputId;

/// Full switcher state as delivered on each state-change event.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitcherState {
    #[serde(default)]
    pub video: Option<VideoState>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoState {
    /// Mix-effect layers; index 0 is the primary one
    #[serde(default, rename = "ME", deserialize_with = "null_as_default")]
    pub mix_effects: Vec<Option<MixEffect>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub super_sources: Vec<Option<SuperSource>>,
}

/// State of one mix-effect layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixEffect {
    #[serde(default)]
    pub program_input: Option<InputId>,
    #[serde(default)]
    pub preview_input: Option<InputId>,
    #[serde(default)]
    pub in_transition: Option<bool>,
    #[serde(default)]
    pub fade_to_black: Option<FadeToBlack>,
    #[serde(default)]
    pub transition_properties: Option<TransitionProperties>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub upstream_keyers: Vec<Option<UpstreamKeyer>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FadeToBlack {
    #[serde(default)]
    pub is_fully_black: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionProperties {
    /// Bitmask of layers taking part in the next transition (1 = background,
    /// 2 = first keyer, ...)
    #[serde(default)]
    pub selection: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamKeyer {
    #[serde(default)]
    pub on_air: Option<bool>,
    #[serde(default)]
    pub fill_source: Option<InputId>,
}

/// Secondary compositing layer arranging several inputs into boxes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SuperSource {
    #[serde(default, deserialize_with = "deserialize_boxes")]
    pub boxes: BTreeMap<u16, SuperSourceBox>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SuperSourceBox {
    #[serde(default, deserialize_with = "null_as_default")]
    pub enabled: bool,
    #[serde(default)]
    pub source: Option<InputId>,
}

impl SwitcherState {
    /// View of the snapshot that the status engine can evaluate.
    ///
    /// Returns `None` when the primary mix-effect layer is missing, in which
    /// case the snapshot must be ignored entirely.
    pub fn actionable(&self) -> Option<ActionableSnapshot<'_>> {
        let video = self.video.as_ref()?;
        let mix_effect = video.mix_effects.first()?.as_ref()?;
        let super_source = video.super_sources.first().and_then(Option::as_ref);
        Some(ActionableSnapshot {
            mix_effect,
            super_source,
        })
    }
}

/// A snapshot known to carry primary mix-effect data.
#[derive(Clone, Copy, Debug)]
pub struct ActionableSnapshot<'a> {
    pub mix_effect: &'a MixEffect,
    pub super_source: Option<&'a SuperSource>,
}

impl MixEffect {
    pub fn is_fully_black(&self) -> bool {
        self.fade_to_black
            .as_ref()
            .and_then(|ftb| ftb.is_fully_black)
            .unwrap_or(false)
    }

    pub fn is_in_transition(&self) -> bool {
        self.in_transition.unwrap_or(false)
    }

    pub fn transition_selection(&self) -> u32 {
        self.transition_properties
            .as_ref()
            .and_then(|tp| tp.selection)
            .unwrap_or(0)
    }

    pub fn upstream_keyer(&self, index: usize) -> Option<&UpstreamKeyer> {
        self.upstream_keyers.get(index).and_then(Option::as_ref)
    }
}

impl UpstreamKeyer {
    pub fn is_on_air(&self) -> bool {
        self.on_air.unwrap_or(false)
    }
}

impl SuperSource {
    /// Returns true if an enabled box shows `input`.
    pub fn routes(&self, input: InputId) -> bool {
        self.boxes
            .values()
            .any(|b| b.enabled && b.source == Some(input))
    }
}

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts boxes either as an object keyed by box index or as an array.
fn deserialize_boxes<'de, D>(deserializer: D) -> Result<BTreeMap<u16, SuperSourceBox>, D::Error>
where
    D: Deserializer<'de>,
{
    struct BoxesVisitor;

    impl<'de> Visitor<'de> for BoxesVisitor {
        type Value = BTreeMap<u16, SuperSourceBox>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map or sequence of supersource boxes")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(BTreeMap::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(BTreeMap::new())
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut boxes = BTreeMap::new();
            while let Some((id, entry)) = map.next_entry::<u16, Option<SuperSourceBox>>()? {
                if let Some(entry) = entry {
                    boxes.insert(id, entry);
                }
            }
            Ok(boxes)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut boxes = BTreeMap::new();
            let mut id: u16 = 0;
            while let Some(entry) = seq.next_element::<Option<SuperSourceBox>>()? {
                if let Some(entry) = entry {
                    boxes.insert(id, entry);
                }
                id = id.saturating_add(1);
            }
            Ok(boxes)
        }
    }

    deserializer.deserialize_any(BoxesVisitor)
}
