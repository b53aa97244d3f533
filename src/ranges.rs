use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cards::{all_hands, hand_at, Hand, HandKind, GRID_SIZE, HAND_COUNT, TOTAL_COMBOS};
use crate::error::{TrainerError, TrainerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Fold,
    Raise,
    Call,
    Mix,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Fold, Action::Raise, Action::Call, Action::Mix];
    /// Actions that can appear in a selection.
    pub const PLAYED: [Action; 3] = [Action::Raise, Action::Call, Action::Mix];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Fold => "fold",
            Action::Raise => "raise",
            Action::Call => "call",
            Action::Mix => "mix",
        }
    }

    /// Click cycle: fold -> raise -> call -> mix -> fold.
    pub fn next(self) -> Action {
        match self {
            Action::Fold => Action::Raise,
            Action::Raise => Action::Call,
            Action::Call => Action::Mix,
            Action::Mix => Action::Fold,
        }
    }

    /// Exact stored name (`"fold"`, `"raise"`, `"call"`, `"mix"`). Anything else,
    /// including other casings and the one-letter shorthands, is `None`.
    pub fn from_name(name: &str) -> Option<Action> {
        Action::ALL.into_iter().find(|a| a.as_str() == name)
    }

    pub fn title(self) -> &'static str {
        match self {
            Action::Fold => "Fold",
            Action::Raise => "Raise",
            Action::Call => "Call",
            Action::Mix => "Mix",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lenient parse for terminal input.
impl FromStr for Action {
    type Err = TrainerError;

    fn from_str(s: &str) -> TrainerResult<Action> {
        match s.trim().to_lowercase().as_str() {
            "fold" | "f" => Ok(Action::Fold),
            "raise" | "r" => Ok(Action::Raise),
            "call" | "c" => Ok(Action::Call),
            "mix" | "m" => Ok(Action::Mix),
            _ => Err(TrainerError::InvalidAction(s.to_string())),
        }
    }
}

/// Non-fold hands and their actions. Fold is never stored explicitly.
pub type Selection = BTreeMap<Hand, Action>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandChange {
    pub hand: Hand,
    pub from: Action,
    pub to: Action,
}

type Observer = Box<dyn FnMut(&HandChange)>;

/// Current action of every hand on the grid.
pub struct RangeStore {
    actions: [Action; HAND_COUNT],
    observers: Vec<Observer>,
}

impl Default for RangeStore {
    fn default() -> Self {
        RangeStore::new()
    }
}

impl fmt::Debug for RangeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeStore")
            .field("selection", &self.current_selection())
            .field("observers", &self.observers.len())
            .finish()
    }
}

fn cell(hand: Hand) -> usize {
    hand.row() * GRID_SIZE + hand.col()
}

impl RangeStore {
    /// A store with every hand folded.
    pub fn new() -> RangeStore {
        RangeStore {
            actions: [Action::Fold; HAND_COUNT],
            observers: Vec::new(),
        }
    }

    /// Registers a callback fired once per hand whose action actually changes.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&HandChange) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn get(&self, hand: Hand) -> Action {
        self.actions[cell(hand)]
    }

    pub fn get_label(&self, label: &str) -> Option<Action> {
        Hand::parse(label).map(|h| self.get(h))
    }

    /// Returns whether anything changed.
    pub fn set_hand_action(&mut self, hand: Hand, action: Action) -> bool {
        let slot = &mut self.actions[cell(hand)];
        if *slot == action {
            return false;
        }
        let change = HandChange {
            hand,
            from: *slot,
            to: action,
        };
        *slot = action;
        for observer in self.observers.iter_mut() {
            observer(&change);
        }
        true
    }

    /// Like [`RangeStore::set_hand_action`] but keyed by label. Unknown labels are a no-op.
    pub fn set_action(&mut self, label: &str, action: Action) -> bool {
        match Hand::parse(label) {
            Some(hand) => self.set_hand_action(hand, action),
            None => false,
        }
    }

    pub fn reset_all(&mut self) {
        for &hand in all_hands() {
            if self.get(hand) != Action::Fold {
                self.set_hand_action(hand, Action::Fold);
            }
        }
    }

    pub fn select_all(&mut self) {
        for &hand in all_hands() {
            if self.get(hand) != Action::Raise {
                self.set_hand_action(hand, Action::Raise);
            }
        }
    }

    /// Replaces the whole grid with `selection`.
    pub fn load(&mut self, selection: &Selection) {
        self.reset_all();
        for (&hand, &action) in selection {
            if action != Action::Fold {
                self.set_hand_action(hand, action);
            }
        }
    }

    pub fn current_selection(&self) -> Selection {
        all_hands()
            .iter()
            .filter_map(|&h| match self.get(h) {
                Action::Fold => None,
                action => Some((h, action)),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.iter().all(|&a| a == Action::Fold)
    }

    pub fn stats(&self) -> RangeStats {
        RangeStats::of(&self.current_selection())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeStats {
    pub raise: usize,
    pub call: usize,
    pub mix: usize,
    pub combos: u32,
}

impl RangeStats {
    pub fn of(selection: &Selection) -> RangeStats {
        let mut stats = RangeStats::default();
        for (hand, action) in selection {
            match action {
                Action::Raise => stats.raise += 1,
                Action::Call => stats.call += 1,
                Action::Mix => stats.mix += 1,
                Action::Fold => continue,
            }
            stats.combos += hand.combo_count();
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.raise + self.call + self.mix
    }

    pub fn pct(count: usize) -> f64 {
        count as f64 / HAND_COUNT as f64 * 100.0
    }

    pub fn combo_pct(&self) -> f64 {
        self.combos as f64 / TOTAL_COMBOS as f64 * 100.0
    }
}

impl fmt::Display for RangeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}% (Raise: {:.1}%, Call: {:.1}%, Mix: {:.1}%) - {} / {}",
            RangeStats::pct(self.total()),
            RangeStats::pct(self.raise),
            RangeStats::pct(self.call),
            RangeStats::pct(self.mix),
            self.total(),
            HAND_COUNT
        )
    }
}

/// Parses a range expression such as `"TT+, ATs+, 77-99, KTs-KQs, AKo"`.
pub fn parse_range(range_str: &str) -> TrainerResult<BTreeSet<Hand>> {
    let mut hands = BTreeSet::new();
    for part in range_str.replace(' ', "").split(',') {
        if part.is_empty() {
            continue;
        }
        let expanded = if let Some(base) = part.strip_suffix('+') {
            expand_plus(base)
        } else if part.contains('-') {
            expand_dash(part)
        } else {
            Hand::parse(part).map(|h| vec![h])
        };
        match expanded {
            Some(list) => hands.extend(list),
            None => return Err(TrainerError::InvalidHandNotation(part.to_string())),
        }
    }
    Ok(hands)
}

fn parts(hand: Hand) -> (usize, usize, HandKind) {
    let (high, low) = hand.ranks();
    (high.grid_index(), low.grid_index(), hand.kind())
}

fn with_ranks(high: usize, low: usize, kind: HandKind) -> Option<Hand> {
    match kind {
        HandKind::Pair | HandKind::Suited => hand_at(high, low),
        HandKind::Offsuit => hand_at(low, high),
    }
}

fn expand_plus(base: &str) -> Option<Vec<Hand>> {
    let (high, low, kind) = parts(Hand::parse(base)?);
    match kind {
        // "TT+" -> TT..AA
        HandKind::Pair => (0..=high).map(|i| with_ranks(i, i, kind)).collect(),
        // "ATs+" -> ATs..AKs
        _ => (high + 1..=low).map(|i| with_ranks(high, i, kind)).collect(),
    }
}

fn expand_dash(part: &str) -> Option<Vec<Hand>> {
    let (start, end) = part.split_once('-')?;
    let (s_high, s_low, s_kind) = parts(Hand::parse(start)?);
    let (e_high, e_low, e_kind) = parts(Hand::parse(end)?);
    if s_kind != e_kind {
        return None;
    }
    match s_kind {
        // "77-TT"
        HandKind::Pair => {
            let (lo, hi) = (s_high.min(e_high), s_high.max(e_high));
            (lo..=hi).map(|i| with_ranks(i, i, s_kind)).collect()
        }
        // "KTs-KQs"
        _ if s_high == e_high => {
            let (lo, hi) = (s_low.min(e_low), s_low.max(e_low));
            (lo..=hi).map(|i| with_ranks(s_high, i, s_kind)).collect()
        }
        _ => None,
    }
}

/// Builds a selection from one range expression per action.
pub fn selection_from_exprs(exprs: &[(Action, &str)]) -> TrainerResult<Selection> {
    let mut selection = Selection::new();
    for &(action, expr) in exprs {
        if action == Action::Fold {
            continue;
        }
        for hand in parse_range(expr)? {
            selection.insert(hand, action);
        }
    }
    Ok(selection)
}
