use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cards::Hand;
use crate::config::STORAGE_KEY;
use crate::error::{TrainerError, TrainerResult};
use crate::ranges::{Action, Selection};
use crate::storage::KeyValueStore;

/// Yes/no decision from a human. The only point where the core waits on the user.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}

/// Answers every question the same way.
#[derive(Debug, Clone, Copy)]
pub struct Always(pub bool);

#[async_trait]
impl Confirm for Always {
    async fn confirm(&self, _message: &str) -> bool {
        self.0
    }
}

/// Stored hands: the current hand-to-action map, or the legacy all-raise list.
///
/// Action names are kept as raw strings so one odd entry never makes the
/// record unreadable; they are checked when converted to a selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SavedHands {
    Legacy(Vec<String>),
    Actions(BTreeMap<String, String>),
}

impl SavedHands {
    pub fn from_selection(selection: &Selection) -> SavedHands {
        SavedHands::Actions(
            selection
                .iter()
                .filter(|(_, &a)| a != Action::Fold)
                .map(|(h, &a)| (h.label(), a.as_str().to_string()))
                .collect(),
        )
    }

    /// Unknown hands, unknown action names and folds are dropped.
    pub fn to_selection(&self) -> Selection {
        match self {
            SavedHands::Legacy(hands) => hands
                .iter()
                .filter_map(|h| Hand::parse(h))
                .map(|h| (h, Action::Raise))
                .collect(),
            SavedHands::Actions(map) => map
                .iter()
                .filter_map(|(label, action)| Some((Hand::parse(label)?, Action::from_name(action)?)))
                .filter(|&(_, a)| a != Action::Fold)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SavedHands::Legacy(hands) => hands.len(),
            SavedHands::Actions(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRange {
    pub name: String,
    pub hands: SavedHands,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: u64,
}

impl SavedRange {
    pub fn selection(&self) -> Selection {
        self.hands.to_selection()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Overwritten,
    /// An entry with the same name exists and the user declined to replace it.
    Declined,
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Named range snapshots persisted as one JSON array under a fixed key.
#[derive(Debug)]
pub struct SavedRangeRepository<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> SavedRangeRepository<S> {
    pub fn new(store: S) -> SavedRangeRepository<S> {
        SavedRangeRepository {
            store,
            key: STORAGE_KEY.to_string(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Persisted order. Unreadable or malformed data reads as empty; a
    /// single undecodable record is skipped with a warning.
    fn read(&self) -> Vec<SavedRange> {
        let text = match self.store.get(&self.key) {
            Ok(Some(text)) => text,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::error!("error reading saved ranges: {}", e);
                return Vec::new();
            }
        };
        let records: Vec<serde_json::Value> = match serde_json::from_str(&text) {
            Ok(records) => records,
            Err(e) => {
                log::error!("error reading saved ranges: {}", e);
                return Vec::new();
            }
        };
        records
            .into_iter()
            .enumerate()
            .filter_map(|(i, record)| match serde_json::from_value::<SavedRange>(record) {
                Ok(range) => Some(range),
                Err(e) => {
                    log::warn!("skipping saved range #{}: {}", i, e);
                    None
                }
            })
            .collect()
    }

    fn write(&mut self, ranges: &[SavedRange]) -> TrainerResult<()> {
        let text = serde_json::to_string(ranges).map_err(|e| TrainerError::Storage(e.to_string()))?;
        self.store.set(&self.key, &text).map_err(|e| {
            log::error!("error saving ranges: {}", e);
            match e {
                TrainerError::Storage(_) => e,
                other => TrainerError::Storage(other.to_string()),
            }
        })
    }

    /// Every saved range, newest first.
    pub fn list(&self) -> Vec<SavedRange> {
        let mut ranges = self.read();
        ranges.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        ranges
    }

    pub fn find(&self, name: &str) -> Option<SavedRange> {
        self.read().into_iter().find(|r| r.name == name)
    }

    pub fn load(&self, name: &str) -> TrainerResult<Selection> {
        self.find(name)
            .map(|r| r.selection())
            .ok_or_else(|| TrainerError::UnknownSavedRange(name.to_string()))
    }

    /// Saves `selection` under the trimmed `name`.
    ///
    /// An existing entry with that name is only replaced after `confirm`
    /// agrees. The collection is re-read after the answer arrives, so a save
    /// that landed while the question was open is not lost.
    pub async fn save(
        &mut self,
        name: &str,
        selection: &Selection,
        confirm: &dyn Confirm,
    ) -> TrainerResult<SaveOutcome> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrainerError::EmptyName);
        }
        if selection.values().all(|&a| a == Action::Fold) {
            return Err(TrainerError::EmptySelection);
        }

        let mut ranges = self.read();
        let outcome = if ranges.iter().any(|r| r.name == name) {
            let message = format!("A range named \"{}\" already exists. Overwrite it?", name);
            if !confirm.confirm(&message).await {
                log::info!("kept existing range \"{}\"", name);
                return Ok(SaveOutcome::Declined);
            }
            ranges = self.read();
            SaveOutcome::Overwritten
        } else {
            SaveOutcome::Created
        };

        let entry = SavedRange {
            name: name.to_string(),
            hands: SavedHands::from_selection(selection),
            timestamp: now_millis(),
        };
        match ranges.iter().position(|r| r.name == name) {
            Some(index) => {
                ranges[index] = entry;
                let mut seen = false;
                ranges.retain(|r| {
                    if r.name != name {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => ranges.push(entry),
        }

        self.write(&ranges)?;
        log::info!("Range \"{}\" saved ({:?})", name, outcome);
        Ok(outcome)
    }

    /// Removes every entry named `name` once `confirm` agrees.
    /// Returns whether anything was removed.
    pub async fn delete(&mut self, name: &str, confirm: &dyn Confirm) -> TrainerResult<bool> {
        if self.find(name).is_none() {
            return Err(TrainerError::UnknownSavedRange(name.to_string()));
        }
        let message = format!("Are you sure you want to delete \"{}\"?", name);
        if !confirm.confirm(&message).await {
            return Ok(false);
        }

        let mut ranges = self.read();
        let before = ranges.len();
        ranges.retain(|r| r.name != name);
        if ranges.len() == before {
            return Ok(false);
        }
        self.write(&ranges)?;
        log::info!("Range \"{}\" deleted", name);
        Ok(true)
    }
}
