use colored::Colorize;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use itertools::Itertools;

use crate::cards::{hand_at, Hand, GRID_RANKS, GRID_SIZE};
use crate::drill::DrillSession;
use crate::presets::PresetCatalog;
use crate::ranges::{Action, RangeStats, Selection};
use crate::recall::{Outcome, RecallScore};
use crate::saved::SavedRange;

fn grid_table<F>(title: &str, render: F) -> String
where
    F: Fn(Hand) -> String,
{
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new("")];
    for rank in GRID_RANKS {
        header.push(Cell::new(rank.to_char()).set_alignment(CellAlignment::Center));
    }
    table.set_header(header);

    for (row, rank) in GRID_RANKS.iter().enumerate() {
        let mut cells = vec![Cell::new(rank.to_char().to_string().bold().to_string())];
        for col in 0..GRID_SIZE {
            let text = hand_at(row, col).map(&render).unwrap_or_default();
            cells.push(Cell::new(text).set_alignment(CellAlignment::Center));
        }
        table.add_row(cells);
    }

    format!("  {}\n{}", title.bold(), table)
}

pub fn styled_hand(hand: Hand, action: Action) -> String {
    let label = hand.label();
    match action {
        Action::Raise => label.red().bold().to_string(),
        Action::Call => label.green().bold().to_string(),
        Action::Mix => label.yellow().bold().to_string(),
        Action::Fold => label.dimmed().to_string(),
    }
}

pub fn styled_action(action: Action) -> String {
    let text = action.title();
    match action {
        Action::Raise => text.red().bold().to_string(),
        Action::Call => text.green().bold().to_string(),
        Action::Mix => text.yellow().bold().to_string(),
        Action::Fold => text.dimmed().bold().to_string(),
    }
}

/// The 13x13 grid with each hand coloured by its action.
pub fn range_grid(selection: &Selection, title: &str) -> String {
    grid_table(title, |hand| {
        styled_hand(hand, selection.get(&hand).copied().unwrap_or(Action::Fold))
    })
}

/// The grid after a recall attempt: correct, incorrect and missed hands are marked.
pub fn recall_grid(score: &RecallScore, title: &str) -> String {
    grid_table(title, |hand| {
        let label = hand.label();
        match score.outcome(hand) {
            Some(Outcome::Correct) => label.on_green().black().to_string(),
            Some(Outcome::Incorrect) => label.on_red().white().to_string(),
            Some(Outcome::Missed) => label.on_yellow().black().to_string(),
            None => label.dimmed().to_string(),
        }
    })
}

pub fn stats_line(stats: &RangeStats) -> String {
    format!(
        "  {} | {} combos ({:.1}%)",
        stats.to_string().bold(),
        stats.combos,
        stats.combo_pct()
    )
}

pub fn recall_summary(score: &RecallScore) -> String {
    [
        format!("  {}", "Results".cyan().bold()),
        format!("  Accuracy: {}", format!("{:.1}%", score.accuracy()).bold()),
        format!("  {} Correct: {} / {}", "\u{2713}".green(), score.correct, score.total),
        format!("  {} Incorrect: {}", "\u{2717}".red(), score.incorrect),
        format!("  {} Missed: {}", "\u{2297}".yellow(), score.missed),
        format!(
            "  {}",
            "Green = Correct | Red = Incorrect | Yellow = Missed".dimmed()
        ),
    ]
    .join("\n")
}

pub fn drill_summary(session: &DrillSession) -> String {
    [
        format!("  {}", "Spot Drill Results".cyan().bold()),
        format!("  Accuracy: {}", format!("{:.1}%", session.accuracy()).bold()),
        format!(
            "  {} Correct: {} / {}",
            "\u{2713}".green(),
            session.correct_answers,
            session.total_attempts
        ),
    ]
    .join("\n")
}

/// Two rank "cards", e.g. `[A] [K]  suited`.
pub fn hand_cards(hand: Hand) -> String {
    let (high, low, _) = hand.card_faces();
    format!(
        "[{}] [{}]  {}",
        high.to_string().bold(),
        low.to_string().bold(),
        hand.kind().as_str().dimmed()
    )
}

pub fn saved_ranges_table(ranges: &[SavedRange]) -> String {
    if ranges.is_empty() {
        return "  No saved ranges yet".dimmed().to_string();
    }
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name"),
        Cell::new("Hands").set_alignment(CellAlignment::Right),
        Cell::new("Saved").set_alignment(CellAlignment::Right),
    ]);
    for range in ranges {
        table.add_row(vec![
            Cell::new(range.name.bold().to_string()),
            Cell::new(range.hands.len()).set_alignment(CellAlignment::Right),
            Cell::new(range.timestamp).set_alignment(CellAlignment::Right),
        ]);
    }
    table.to_string()
}

pub fn presets_table(catalog: &PresetCatalog) -> String {
    if catalog.is_empty() {
        return "  No presets available".dimmed().to_string();
    }
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Key"),
        Cell::new("Name"),
        Cell::new("Hands").set_alignment(CellAlignment::Right),
        Cell::new("Description"),
    ]);
    for (key, preset) in catalog.iter() {
        let selection = preset.selection();
        let breakdown = Action::PLAYED
            .iter()
            .map(|&a| (a, selection.values().filter(|&&v| v == a).count()))
            .filter(|&(_, n)| n > 0)
            .map(|(a, n)| format!("{} {}", n, a))
            .join(", ");
        table.add_row(vec![
            Cell::new(key.bold().to_string()),
            Cell::new(&preset.name),
            Cell::new(format!("{} ({})", selection.len(), breakdown))
                .set_alignment(CellAlignment::Right),
            Cell::new(&preset.description),
        ]);
    }
    table.to_string()
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "Warning:".yellow().bold(), msg);
}

pub fn print_success(msg: &str) {
    println!("{}", msg.green().bold());
}
