//! Turns a saved range back into a preset entry ready to paste into a presets document.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cards::Hand;
use crate::error::TrainerResult;
use crate::ranges::{Action, Selection};
use crate::saved::SavedRange;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupedHands {
    pub raise: Vec<Hand>,
    pub call: Vec<Hand>,
    pub mix: Vec<Hand>,
}

impl GroupedHands {
    pub fn from_selection(selection: &Selection) -> GroupedHands {
        let mut grouped = GroupedHands::default();
        for (&hand, &action) in selection {
            match action {
                Action::Raise => grouped.raise.push(hand),
                Action::Call => grouped.call.push(hand),
                Action::Mix => grouped.mix.push(hand),
                Action::Fold => {}
            }
        }
        grouped
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedPreset {
    pub name: String,
    pub description: String,
    pub hands: GroupedHands,
}

/// The ECMAScript `\s` class: `char::is_whitespace` minus U+0085, plus U+FEFF.
fn is_slug_space(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r' | ' ' | '\u{A0}' | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}' | '\u{2029}' | '\u{202F}' | '\u{205F}' | '\u{3000}' | '\u{FEFF}'
    )
}

/// Lowercases, turns each whitespace run into one hyphen, then drops
/// everything outside `[a-z0-9-]`. `"4-Bet Jam!"` becomes `"4-bet-jam"`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.to_lowercase().chars() {
        if is_slug_space(c) {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
        }
    }
    slug
}

/// The slug key and the grouped preset for `range`. Legacy list ranges
/// come out as all raise.
pub fn to_preset_shape(range: &SavedRange) -> (String, ExportedPreset) {
    let preset = ExportedPreset {
        name: range.name.clone(),
        description: format!("Custom range: {}", range.name),
        hands: GroupedHands::from_selection(&range.selection()),
    };
    (slugify(&range.name), preset)
}

/// Two-space indented JSON of `{ "<slug>": { name, description, hands } }`.
pub fn to_preset_json(range: &SavedRange) -> TrainerResult<String> {
    let (key, preset) = to_preset_shape(range);
    let mut wrapper = BTreeMap::new();
    wrapper.insert(key, preset);
    Ok(serde_json::to_string_pretty(&wrapper)?)
}
