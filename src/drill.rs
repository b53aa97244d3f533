//! Spot drill: one hand at a time from the answer key, with running accuracy.
//!
//! After each answer the session holds a [`RevealTicket`] until the host's
//! display delay has passed and it calls [`SpotDrill::reveal`]. Answers are
//! refused while a reveal is pending. Tickets from a session that has since
//! been stopped or restarted are ignored.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::cards::Hand;
use crate::config::DRILL_BATCH;
use crate::error::{TrainerError, TrainerResult};
use crate::ranges::{Action, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrillResult {
    pub hand: Hand,
    pub correct_action: Action,
    pub user_action: Action,
    pub was_correct: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrillSession {
    pub queue: Vec<Hand>,
    pub cursor: usize,
    pub correct_answers: usize,
    pub total_attempts: usize,
    pub results: Vec<DrillResult>,
}

impl DrillSession {
    /// Correct over attempted, as a percentage rounded to one decimal.
    pub fn accuracy(&self) -> f64 {
        if self.total_attempts == 0 {
            return 0.0;
        }
        (self.correct_answers as f64 / self.total_attempts as f64 * 1000.0).round() / 10.0
    }

    /// `(answered, queued)`.
    pub fn progress(&self) -> (usize, usize) {
        (self.cursor, self.queue.len())
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.queue.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillPhase {
    Stopped,
    Running,
    Finished,
}

/// Handle for the delayed reveal that follows an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTicket {
    generation: u64,
    cursor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub result: DrillResult,
    pub ticket: RevealTicket,
}

impl Feedback {
    pub fn message(&self) -> String {
        if self.result.was_correct {
            "\u{2713} Correct!".to_string()
        } else {
            format!(
                "\u{2717} Wrong! Correct action: {}",
                self.result.correct_action.title()
            )
        }
    }
}

#[derive(Debug)]
pub struct SpotDrill {
    key: Selection,
    batch: usize,
    phase: DrillPhase,
    session: Option<DrillSession>,
    pending: Option<RevealTicket>,
    generation: u64,
    rng: StdRng,
}

impl SpotDrill {
    pub fn new(key: Selection) -> SpotDrill {
        SpotDrill::with_rng(key, StdRng::from_entropy())
    }

    pub fn with_rng(key: Selection, rng: StdRng) -> SpotDrill {
        SpotDrill {
            key,
            batch: DRILL_BATCH,
            phase: DrillPhase::Stopped,
            session: None,
            pending: None,
            generation: 0,
            rng,
        }
    }

    pub fn with_batch(mut self, batch: usize) -> SpotDrill {
        self.batch = batch.max(1);
        self
    }

    pub fn phase(&self) -> DrillPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&DrillSession> {
        self.session.as_ref()
    }

    pub fn answer_key(&self) -> &Selection {
        &self.key
    }

    pub fn is_awaiting_reveal(&self) -> bool {
        self.pending.is_some()
    }

    /// The hand waiting for an answer, if any.
    pub fn current_hand(&self) -> Option<Hand> {
        if self.phase != DrillPhase::Running || self.pending.is_some() {
            return None;
        }
        let session = self.session.as_ref()?;
        session.queue.get(session.cursor).copied()
    }

    /// Up to `count` shuffled hands from the key, avoiding `exclude` unless
    /// that would leave nothing to draw.
    fn draw(&mut self, count: usize, exclude: &[Hand]) -> Vec<Hand> {
        let mut pool: Vec<Hand> = self
            .key
            .keys()
            .filter(|h| !exclude.contains(h))
            .copied()
            .collect();
        if pool.is_empty() {
            pool = self.key.keys().copied().collect();
        }
        pool.shuffle(&mut self.rng);
        pool.truncate(count);
        pool
    }

    /// Begins a fresh session, discarding any previous one.
    pub fn start(&mut self) {
        self.generation += 1;
        self.pending = None;
        let queue = self.draw(self.batch, &[]);
        log::debug!("spot drill started with {} hands", queue.len());
        self.phase = if queue.is_empty() {
            DrillPhase::Finished
        } else {
            DrillPhase::Running
        };
        self.session = Some(DrillSession {
            queue,
            ..DrillSession::default()
        });
    }

    pub fn restart(&mut self) {
        self.start();
    }

    pub fn stop(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.session = None;
        self.phase = DrillPhase::Stopped;
    }

    pub fn answer(&mut self, hand: Hand, action: Action) -> TrainerResult<Feedback> {
        if self.phase != DrillPhase::Running {
            return Err(TrainerError::DrillNotRunning);
        }
        if self.pending.is_some() {
            return Err(TrainerError::AwaitingReveal);
        }
        let session = self.session.as_mut().ok_or(TrainerError::DrillNotRunning)?;
        let expected = *session
            .queue
            .get(session.cursor)
            .ok_or(TrainerError::DrillNotRunning)?;
        if hand != expected {
            return Err(TrainerError::WrongHand {
                expected: expected.label(),
                got: hand.label(),
            });
        }

        let correct_action = self.key.get(&hand).copied().unwrap_or(Action::Fold);
        let result = DrillResult {
            hand,
            correct_action,
            user_action: action,
            was_correct: action == correct_action,
        };
        session.results.push(result);
        session.total_attempts += 1;
        if result.was_correct {
            session.correct_answers += 1;
        }
        session.cursor += 1;

        let ticket = RevealTicket {
            generation: self.generation,
            cursor: session.cursor,
        };
        self.pending = Some(ticket);
        Ok(Feedback { result, ticket })
    }

    /// Completes a delayed reveal. Returns `false` for stale tickets.
    pub fn reveal(&mut self, ticket: RevealTicket) -> bool {
        if self.pending != Some(ticket) {
            log::debug!("discarding stale reveal {:?}", ticket);
            return false;
        }
        self.pending = None;
        if self.session.as_ref().map_or(true, |s| s.is_exhausted()) {
            self.phase = DrillPhase::Finished;
        }
        true
    }

    /// Extends a finished session with up to one more batch, preferring hands
    /// not yet shown. Returns how many hands were added.
    pub fn continue_drill(&mut self) -> TrainerResult<usize> {
        if self.phase != DrillPhase::Finished {
            return Err(TrainerError::DrillNotFinished);
        }
        let shown: Vec<Hand> = match &self.session {
            Some(session) => session.results.iter().map(|r| r.hand).collect(),
            None => return Err(TrainerError::DrillNotRunning),
        };
        let extra = self.draw(self.batch, &shown);
        if extra.is_empty() {
            return Ok(0);
        }
        let added = extra.len();
        if let Some(session) = self.session.as_mut() {
            session.queue.extend(extra);
        }
        self.phase = DrillPhase::Running;
        Ok(added)
    }
}
