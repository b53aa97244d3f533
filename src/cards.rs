//! The hand catalog: 169 canonical starting hands laid out on a 13x13 grid.
//!
//! Row and column both index ranks from high to low. The diagonal holds the
//! pairs, cells above it the suited hands and cells below it the offsuit ones.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{TrainerError, TrainerResult};

/// Rank symbols in grid order, high to low.
pub const RANKS_STR: &str = "AKQJT98765432";
pub const GRID_SIZE: usize = 13;
pub const HAND_COUNT: usize = GRID_SIZE * GRID_SIZE;
pub const TOTAL_COMBOS: u32 = 1326;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    pub fn from_char(c: char) -> Option<Rank> {
        match c {
            '2' => Some(Rank::Two),
            '3' => Some(Rank::Three),
            '4' => Some(Rank::Four),
            '5' => Some(Rank::Five),
            '6' => Some(Rank::Six),
            '7' => Some(Rank::Seven),
            '8' => Some(Rank::Eight),
            '9' => Some(Rank::Nine),
            'T' => Some(Rank::Ten),
            'J' => Some(Rank::Jack),
            'Q' => Some(Rank::Queen),
            'K' => Some(Rank::King),
            'A' => Some(Rank::Ace),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }

    /// Position of this rank on a grid axis (Ace = 0, Two = 12).
    pub fn grid_index(self) -> usize {
        14 - self as usize
    }

    pub fn from_grid_index(index: usize) -> Option<Rank> {
        GRID_RANKS.get(index).copied()
    }
}

pub const GRID_RANKS: [Rank; GRID_SIZE] = [
    Rank::Ace,
    Rank::King,
    Rank::Queen,
    Rank::Jack,
    Rank::Ten,
    Rank::Nine,
    Rank::Eight,
    Rank::Seven,
    Rank::Six,
    Rank::Five,
    Rank::Four,
    Rank::Three,
    Rank::Two,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandKind {
    Pair,
    Suited,
    Offsuit,
}

impl HandKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HandKind::Pair => "pair",
            HandKind::Suited => "suited",
            HandKind::Offsuit => "offsuit",
        }
    }
}

impl fmt::Display for HandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the 169 starting hands, identified by its grid cell.
///
/// Ordering follows the grid row by row, so sorted collections of hands come
/// out in the same order the grid is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hand {
    row: u8,
    col: u8,
}

impl Hand {
    pub fn row(self) -> usize {
        self.row as usize
    }

    pub fn col(self) -> usize {
        self.col as usize
    }

    pub fn kind(self) -> HandKind {
        if self.row == self.col {
            HandKind::Pair
        } else if self.row < self.col {
            HandKind::Suited
        } else {
            HandKind::Offsuit
        }
    }

    /// The two ranks, higher first.
    pub fn ranks(self) -> (Rank, Rank) {
        let hi = self.row.min(self.col) as usize;
        let lo = self.row.max(self.col) as usize;
        (GRID_RANKS[hi], GRID_RANKS[lo])
    }

    /// Rank symbols plus suitedness, for rendering a hand as two cards.
    pub fn card_faces(self) -> (char, char, bool) {
        let (high, low) = self.ranks();
        (high.to_char(), low.to_char(), self.kind() == HandKind::Suited)
    }

    pub fn label(self) -> String {
        let (high, low) = self.ranks();
        match self.kind() {
            HandKind::Pair => format!("{}{}", high.to_char(), low.to_char()),
            HandKind::Suited => format!("{}{}s", high.to_char(), low.to_char()),
            HandKind::Offsuit => format!("{}{}o", high.to_char(), low.to_char()),
        }
    }

    pub fn combo_count(self) -> u32 {
        match self.kind() {
            HandKind::Pair => 6,
            HandKind::Suited => 4,
            HandKind::Offsuit => 12,
        }
    }

    /// Looks up a canonical label such as `"AA"`, `"AKs"` or `"T9o"`.
    ///
    /// Returns `None` for anything that is not one of the 169 labels,
    /// including reversed ranks (`"KAs"`) and suffixed pairs (`"AAs"`).
    pub fn parse(label: &str) -> Option<Hand> {
        let chars: Vec<char> = label.chars().collect();
        let (high, low) = match chars.as_slice() {
            [a, b] | [a, b, _] => (Rank::from_char(*a)?, Rank::from_char(*b)?),
            _ => return None,
        };
        let (hi, lo) = (high.grid_index(), low.grid_index());
        match chars.get(2).copied() {
            None if hi == lo => hand_at(hi, lo),
            Some('s') if hi < lo => hand_at(hi, lo),
            Some('o') if hi < lo => hand_at(lo, hi),
            _ => None,
        }
    }
}

/// Maps a grid cell to its hand. `None` outside the 13x13 grid.
pub fn hand_at(row: usize, col: usize) -> Option<Hand> {
    if row >= GRID_SIZE || col >= GRID_SIZE {
        return None;
    }
    Some(Hand {
        row: row as u8,
        col: col as u8,
    })
}

static CATALOG: Lazy<Vec<Hand>> = Lazy::new(|| {
    (0..GRID_SIZE)
        .flat_map(|row| (0..GRID_SIZE).filter_map(move |col| hand_at(row, col)))
        .collect()
});

/// All 169 hands in grid order.
pub fn all_hands() -> &'static [Hand] {
    &CATALOG
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for Hand {
    type Err = TrainerError;

    fn from_str(s: &str) -> TrainerResult<Hand> {
        Hand::parse(s.trim()).ok_or_else(|| TrainerError::InvalidHandNotation(s.to_string()))
    }
}

impl Serialize for Hand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for Hand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Hand, D::Error> {
        let label = String::deserialize(deserializer)?;
        Hand::parse(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hand notation: {}", label)))
    }
}
