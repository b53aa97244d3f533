use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cards::Hand;
use crate::config::DRILL_BATCH;
use crate::drill::SpotDrill;
use crate::error::{TrainerError, TrainerResult};
use crate::presets::PresetCatalog;
use crate::ranges::{Action, RangeStats, RangeStore, Selection};
use crate::recall::{RecallScore, RecallTrainer};
use crate::saved::{Confirm, SaveOutcome, SavedRangeRepository};
use crate::storage::KeyValueStore;

pub const CUSTOM_RANGE_NAME: &str = "Custom Range";
pub const CUSTOM_RANGE_DESCRIPTION: &str = "User-created range";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Edit,
    Train,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingMode {
    RangeRecall,
    SpotDrill,
}

/// The answer key plus the label shown while training on it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingTarget {
    pub name: String,
    pub description: String,
    pub hands: Selection,
}

#[derive(Debug)]
struct TrainingSession {
    target: TrainingTarget,
    mode: TrainingMode,
    recall: RecallTrainer,
    drill: Option<SpotDrill>,
}

/// Owns the grid, the preset catalog and any training session.
#[derive(Debug)]
pub struct AppState {
    grid: RangeStore,
    presets: PresetCatalog,
    loaded_preset: Option<String>,
    edit_action: Action,
    training: Option<TrainingSession>,
    drill_batch: usize,
    drill_seed: Option<u64>,
}

impl AppState {
    pub fn new(presets: PresetCatalog) -> AppState {
        AppState {
            grid: RangeStore::new(),
            presets,
            loaded_preset: None,
            edit_action: Action::Raise,
            training: None,
            drill_batch: DRILL_BATCH,
            drill_seed: None,
        }
    }

    pub fn with_drill_batch(mut self, batch: usize) -> AppState {
        self.drill_batch = batch;
        self
    }

    /// Makes drill queues reproducible.
    pub fn with_drill_seed(mut self, seed: u64) -> AppState {
        self.drill_seed = Some(seed);
        self
    }

    pub fn grid(&self) -> &RangeStore {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut RangeStore {
        &mut self.grid
    }

    pub fn presets(&self) -> &PresetCatalog {
        &self.presets
    }

    pub fn loaded_preset(&self) -> Option<&str> {
        self.loaded_preset.as_deref()
    }

    pub fn stats(&self) -> RangeStats {
        self.grid.stats()
    }

    pub fn mode(&self) -> Mode {
        if self.training.is_some() {
            Mode::Train
        } else {
            Mode::Edit
        }
    }

    pub fn edit_action(&self) -> Action {
        self.edit_action
    }

    pub fn set_edit_action(&mut self, action: Action) {
        self.edit_action = action;
    }

    /// Applies the current edit action to one cell, as a click or drag does.
    pub fn paint(&mut self, hand: Hand) -> bool {
        self.grid.set_hand_action(hand, self.edit_action)
    }

    pub fn load_preset(&mut self, key: &str) -> TrainerResult<()> {
        let selection = self.presets.require(key)?.selection();
        self.grid.load(&selection);
        self.loaded_preset = Some(key.to_string());
        Ok(())
    }

    pub fn load_saved<S: KeyValueStore>(
        &mut self,
        repo: &SavedRangeRepository<S>,
        name: &str,
    ) -> TrainerResult<()> {
        let selection = repo.load(name)?;
        self.grid.load(&selection);
        self.loaded_preset = None;
        Ok(())
    }

    pub async fn save_current<S: KeyValueStore>(
        &self,
        repo: &mut SavedRangeRepository<S>,
        name: &str,
        confirm: &dyn Confirm,
    ) -> TrainerResult<SaveOutcome> {
        repo.save(name, &self.grid.current_selection(), confirm).await
    }

    /// Freezes the painted range as the answer key and clears the grid for recall.
    pub fn enter_train(&mut self) -> TrainerResult<&TrainingTarget> {
        if self.training.is_some() {
            return self.training_target();
        }
        if self.grid.is_empty() {
            return Err(TrainerError::EmptySelection);
        }
        let (name, description) = match self.loaded_preset.as_deref().and_then(|k| self.presets.get(k)) {
            Some(preset) => (preset.name.clone(), preset.description.clone()),
            None => (CUSTOM_RANGE_NAME.to_string(), CUSTOM_RANGE_DESCRIPTION.to_string()),
        };
        let target = TrainingTarget {
            name,
            description,
            hands: self.grid.current_selection(),
        };
        let mut recall = RecallTrainer::new();
        recall.arm_with(target.hands.clone(), &mut self.grid);
        log::info!("training on \"{}\" ({} hands)", target.name, target.hands.len());
        self.training = Some(TrainingSession {
            target,
            mode: TrainingMode::RangeRecall,
            recall,
            drill: None,
        });
        self.training_target()
    }

    /// Back to editing, with the answer key painted on the grid again.
    pub fn exit_train(&mut self) -> TrainerResult<()> {
        let session = self.training.take().ok_or(TrainerError::NotTraining)?;
        self.grid.load(&session.target.hands);
        Ok(())
    }

    pub fn training_target(&self) -> TrainerResult<&TrainingTarget> {
        self.training
            .as_ref()
            .map(|s| &s.target)
            .ok_or(TrainerError::NotTraining)
    }

    pub fn training_mode(&self) -> Option<TrainingMode> {
        self.training.as_ref().map(|s| s.mode)
    }

    /// Switching to spot drill starts a fresh session; switching away discards it.
    pub fn switch_training_mode(&mut self, mode: TrainingMode) -> TrainerResult<()> {
        let session = self.training.as_mut().ok_or(TrainerError::NotTraining)?;
        session.mode = mode;
        match mode {
            TrainingMode::SpotDrill => {
                let rng = match self.drill_seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                let mut drill =
                    SpotDrill::with_rng(session.target.hands.clone(), rng).with_batch(self.drill_batch);
                drill.start();
                session.drill = Some(drill);
            }
            TrainingMode::RangeRecall => {
                if let Some(mut drill) = session.drill.take() {
                    drill.stop();
                }
            }
        }
        Ok(())
    }

    pub fn submit_recall(&mut self) -> TrainerResult<RecallScore> {
        let session = self.training.as_mut().ok_or(TrainerError::NotTraining)?;
        session.recall.submit(&self.grid)
    }

    pub fn reset_recall(&mut self) -> TrainerResult<()> {
        let session = self.training.as_mut().ok_or(TrainerError::NotTraining)?;
        session.recall.reset(&mut self.grid)
    }

    pub fn last_recall_score(&self) -> Option<&RecallScore> {
        self.training.as_ref().and_then(|s| s.recall.last_score())
    }

    pub fn drill(&self) -> TrainerResult<&SpotDrill> {
        let session = self.training.as_ref().ok_or(TrainerError::NotTraining)?;
        session.drill.as_ref().ok_or(TrainerError::DrillNotRunning)
    }

    pub fn drill_mut(&mut self) -> TrainerResult<&mut SpotDrill> {
        let session = self.training.as_mut().ok_or(TrainerError::NotTraining)?;
        session.drill.as_mut().ok_or(TrainerError::DrillNotRunning)
    }
}
