use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::cards::Hand;
use crate::error::{TrainerError, TrainerResult};
use crate::ranges::{Action, Selection};

static BUNDLED_PRESETS_JSON: &str = include_str!("../data/presets.json");

/// The three interchangeable shapes a preset's `hands` field may take.
///
/// Decoding tries each variant in declaration order and keeps the first
/// that fits: a list, then a hand-to-action map, then an action-to-hands map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HandsFormat {
    /// Legacy list; every hand is a raise.
    List(Vec<String>),
    /// `{"AA": "raise", "KK": "call"}`
    Flat(BTreeMap<String, String>),
    /// `{"raise": ["AA", "KK"], "call": ["QQ"]}`
    Grouped(ActionGroups),
}

/// Action-to-hands groups in document order. A hand listed under several
/// groups ends up with the last one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionGroups(pub Vec<(String, Vec<String>)>);

impl Serialize for ActionGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (action, hands) in &self.0 {
            map.serialize_entry(action, hands)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ActionGroups {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<ActionGroups, D::Error> {
        struct GroupsVisitor;

        impl<'de> Visitor<'de> for GroupsVisitor {
            type Value = ActionGroups;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of action names to hand lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ActionGroups, A::Error> {
                let mut groups = Vec::new();
                while let Some((action, hands)) = access.next_entry::<String, Vec<String>>()? {
                    groups.push((action, hands));
                }
                Ok(ActionGroups(groups))
            }
        }

        deserializer.deserialize_map(GroupsVisitor)
    }
}

impl HandsFormat {
    pub fn decode(value: serde_json::Value) -> TrainerResult<HandsFormat> {
        Ok(serde_json::from_value(value)?)
    }

    /// Canonical hand-to-action mapping. Unknown hands and action names are
    /// dropped, and fold entries never survive. Action names must match exactly.
    pub fn normalize(&self) -> Selection {
        let mut selection = Selection::new();
        match self {
            HandsFormat::List(hands) => {
                for hand in hands.iter().filter_map(|h| Hand::parse(h)) {
                    selection.insert(hand, Action::Raise);
                }
            }
            HandsFormat::Flat(map) => {
                for (label, action) in map {
                    if let (Some(hand), Some(action)) = (Hand::parse(label), Action::from_name(action)) {
                        assign(&mut selection, hand, action);
                    }
                }
            }
            HandsFormat::Grouped(ActionGroups(groups)) => {
                for (action, hands) in groups {
                    let Some(action) = Action::from_name(action) else {
                        log::debug!("ignoring unknown action group {:?}", action);
                        continue;
                    };
                    for hand in hands.iter().filter_map(|h| Hand::parse(h)) {
                        assign(&mut selection, hand, action);
                    }
                }
            }
        }
        selection
    }
}

fn assign(selection: &mut Selection, hand: Hand, action: Action) {
    if action == Action::Fold {
        selection.remove(&hand);
    } else {
        selection.insert(hand, action);
    }
}

/// Shorthand for decoding and normalizing a raw `hands` value.
pub fn normalize(value: serde_json::Value) -> TrainerResult<Selection> {
    Ok(HandsFormat::decode(value)?.normalize())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub hands: HandsFormat,
}

impl Preset {
    pub fn selection(&self) -> Selection {
        self.hands.normalize()
    }
}

/// Presets keyed by identifier, as read from a presets document.
#[derive(Debug, Clone, Default)]
pub struct PresetCatalog {
    presets: BTreeMap<String, Preset>,
}

impl PresetCatalog {
    /// Parses a presets document. A malformed entry is skipped with a warning;
    /// a malformed document yields an empty catalog.
    pub fn from_json(text: &str) -> PresetCatalog {
        let raw: BTreeMap<String, serde_json::Value> = match serde_json::from_str(text) {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("error loading presets: {}", e);
                return PresetCatalog::default();
            }
        };
        let mut presets = BTreeMap::new();
        for (key, value) in raw {
            match serde_json::from_value::<Preset>(value) {
                Ok(preset) => {
                    presets.insert(key, preset);
                }
                Err(e) => log::warn!("skipping preset \"{}\": {}", key, e),
            }
        }
        log::info!("presets loaded: {:?}", presets.keys().collect::<Vec<_>>());
        PresetCatalog { presets }
    }

    /// Reads a presets file, degrading to an empty catalog when it is missing
    /// or unreadable.
    pub fn from_file(path: &Path) -> PresetCatalog {
        match std::fs::read_to_string(path) {
            Ok(text) => PresetCatalog::from_json(&text),
            Err(e) => {
                log::error!("failed to load {}: {}", path.display(), e);
                PresetCatalog::default()
            }
        }
    }

    pub fn bundled() -> PresetCatalog {
        BUNDLED.clone()
    }

    pub fn get(&self, key: &str) -> Option<&Preset> {
        self.presets.get(key)
    }

    /// Like [`PresetCatalog::get`], but logs and reports unknown keys.
    pub fn require(&self, key: &str) -> TrainerResult<&Preset> {
        self.presets.get(key).ok_or_else(|| {
            log::warn!("Preset \"{}\" not found", key);
            TrainerError::UnknownPreset(key.to_string())
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Preset)> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

static BUNDLED: Lazy<PresetCatalog> = Lazy::new(|| PresetCatalog::from_json(BUNDLED_PRESETS_JSON));
