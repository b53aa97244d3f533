//! Range recall: repaint the whole answer key from memory, then score the grid.

use std::collections::BTreeMap;

use crate::cards::Hand;
use crate::error::{TrainerError, TrainerResult};
use crate::ranges::{RangeStore, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Same action as the key.
    Correct,
    /// Painted with the wrong action, or painted when the key folds it.
    Incorrect,
    /// In the key but left folded.
    Missed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecallScore {
    pub correct: usize,
    pub incorrect: usize,
    pub missed: usize,
    /// Size of the answer key.
    pub total: usize,
    pub outcomes: BTreeMap<Hand, Outcome>,
}

impl RecallScore {
    /// Correct hands over answer-key size, as a percentage rounded to one decimal.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.correct as f64 / self.total as f64 * 1000.0).round() / 10.0
    }

    pub fn outcome(&self, hand: Hand) -> Option<Outcome> {
        self.outcomes.get(&hand).copied()
    }
}

pub fn score(answer_key: &Selection, user: &Selection) -> RecallScore {
    let mut result = RecallScore {
        correct: 0,
        incorrect: 0,
        missed: 0,
        total: answer_key.len(),
        outcomes: BTreeMap::new(),
    };

    for (&hand, &expected) in answer_key {
        let outcome = match user.get(&hand) {
            Some(&given) if given == expected => Outcome::Correct,
            Some(_) => Outcome::Incorrect,
            None => Outcome::Missed,
        };
        match outcome {
            Outcome::Correct => result.correct += 1,
            Outcome::Incorrect => result.incorrect += 1,
            Outcome::Missed => result.missed += 1,
        }
        result.outcomes.insert(hand, outcome);
    }

    // Over-selection: painted hands the key folds.
    for &hand in user.keys().filter(|h| !answer_key.contains_key(h)) {
        result.incorrect += 1;
        result.outcomes.insert(hand, Outcome::Incorrect);
    }

    result
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RecallState {
    #[default]
    Idle,
    Armed { key: Selection },
    Scored { key: Selection, score: RecallScore },
}

#[derive(Debug, Clone, Default)]
pub struct RecallTrainer {
    state: RecallState,
}

impl RecallTrainer {
    pub fn new() -> RecallTrainer {
        RecallTrainer::default()
    }

    pub fn state(&self) -> &RecallState {
        &self.state
    }

    pub fn answer_key(&self) -> Option<&Selection> {
        match &self.state {
            RecallState::Idle => None,
            RecallState::Armed { key } | RecallState::Scored { key, .. } => Some(key),
        }
    }

    pub fn last_score(&self) -> Option<&RecallScore> {
        match &self.state {
            RecallState::Scored { score, .. } => Some(score),
            _ => None,
        }
    }

    /// Snapshots the grid as the answer key and clears it for the attempt.
    pub fn arm(&mut self, grid: &mut RangeStore) {
        self.arm_with(grid.current_selection(), grid);
    }

    /// Arms with an explicit key, clearing the grid.
    pub fn arm_with(&mut self, key: Selection, grid: &mut RangeStore) {
        grid.reset_all();
        log::debug!("recall armed with {} hands", key.len());
        self.state = RecallState::Armed { key };
    }

    /// Scores the grid against the key. May be called again after more edits.
    pub fn submit(&mut self, grid: &RangeStore) -> TrainerResult<RecallScore> {
        let key = match std::mem::take(&mut self.state) {
            RecallState::Idle => return Err(TrainerError::NotTraining),
            RecallState::Armed { key } | RecallState::Scored { key, .. } => key,
        };
        let result = score(&key, &grid.current_selection());
        log::info!(
            "recall scored: {} correct, {} incorrect, {} missed ({:.1}%)",
            result.correct,
            result.incorrect,
            result.missed,
            result.accuracy()
        );
        self.state = RecallState::Scored {
            key,
            score: result.clone(),
        };
        Ok(result)
    }

    /// Clears the grid and the last score. The key stays armed.
    pub fn reset(&mut self, grid: &mut RangeStore) -> TrainerResult<()> {
        let key = match std::mem::take(&mut self.state) {
            RecallState::Idle => return Err(TrainerError::NotTraining),
            RecallState::Armed { key } | RecallState::Scored { key, .. } => key,
        };
        grid.reset_all();
        self.state = RecallState::Armed { key };
        Ok(())
    }

    /// Leaves recall, handing back the key.
    pub fn exit(&mut self) -> Option<Selection> {
        match std::mem::take(&mut self.state) {
            RecallState::Idle => None,
            RecallState::Armed { key } | RecallState::Scored { key, .. } => Some(key),
        }
    }
}
