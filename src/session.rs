use std::io::{BufRead, Write};
use std::thread;
use std::time::Duration;

use colored::Colorize;

use crate::app::{AppState, TrainingMode};
use crate::display::{drill_summary, hand_cards, recall_grid, recall_summary, styled_action};
use crate::drill::DrillPhase;
use crate::error::TrainerResult;
use crate::ranges::{parse_range, Action};

// ---------------------------------------------------------------------------
// Prompt helpers
// ---------------------------------------------------------------------------

pub(crate) fn prompt(
    message: &str,
    default: Option<&str>,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> String {
    if let Some(d) = default {
        write!(writer, "{} [{}]: ", message, d).ok();
    } else {
        write!(writer, "{}: ", message).ok();
    }
    writer.flush().ok();

    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) => "q".to_string(),
        Ok(_) => {
            let trimmed = line.trim().to_string();
            if trimmed.is_empty() {
                default.unwrap_or("").to_string()
            } else {
                trimmed
            }
        }
        Err(_) => "q".to_string(),
    }
}

pub(crate) fn prompt_yn(
    message: &str,
    default: &str,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Option<bool> {
    let answer = prompt(&format!("{} (y/n)", message), Some(default), reader, writer);
    if answer.eq_ignore_ascii_case("q") {
        return None;
    }
    Some(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

struct QuitSession;

fn print_target(app: &AppState, writer: &mut dyn Write) {
    if let Ok(target) = app.training_target() {
        writeln!(writer).ok();
        writeln!(writer, "{}", target.name.cyan().bold()).ok();
        writeln!(writer, "{}", target.description.dimmed()).ok();
    }
}

// ---------------------------------------------------------------------------
// Range recall
// ---------------------------------------------------------------------------

/// Repaint-from-memory loop. `app` must already be in train mode.
pub fn run_recall_session(
    app: &mut AppState,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> TrainerResult<()> {
    app.switch_training_mode(TrainingMode::RangeRecall)?;
    print_target(app, writer);
    writeln!(
        writer,
        "Enter each action's hands as a range (e.g. {}). Type {} to quit.\n",
        "TT+, AQs+, KQo".bold(),
        "'q'".bold()
    )
    .ok();

    loop {
        if paint_attempt(app, reader, writer).is_err() {
            return Ok(());
        }
        let score = app.submit_recall()?;
        writeln!(writer).ok();
        writeln!(writer, "{}", recall_grid(&score, "Your attempt")).ok();
        writeln!(writer, "{}", recall_summary(&score)).ok();

        match prompt_yn("\nTry again?", "y", reader, writer) {
            Some(true) => app.reset_recall()?,
            _ => return Ok(()),
        }
    }
}

fn paint_attempt(
    app: &mut AppState,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<(), QuitSession> {
    for action in Action::PLAYED {
        let hands = loop {
            let expr = prompt(&format!("  {}", styled_action(action)), None, reader, writer);
            if expr.eq_ignore_ascii_case("q") {
                return Err(QuitSession);
            }
            match parse_range(&expr) {
                Ok(hands) => break hands,
                Err(e) => {
                    writeln!(writer, "  {}", e.to_string().red()).ok();
                }
            }
        };
        app.set_edit_action(action);
        for hand in hands {
            app.paint(hand);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Spot drill
// ---------------------------------------------------------------------------

/// One-hand-at-a-time quiz. `app` must already be in train mode.
pub fn run_drill_session(
    app: &mut AppState,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
    reveal_delay: Duration,
) -> TrainerResult<()> {
    app.switch_training_mode(TrainingMode::SpotDrill)?;
    print_target(app, writer);
    writeln!(
        writer,
        "Answer {}aise, {}all, {}ix or {}old. Type {} to quit.\n",
        "r".bold(),
        "c".bold(),
        "m".bold(),
        "f".bold(),
        "'q'".bold()
    )
    .ok();

    loop {
        let drill = app.drill_mut()?;
        match drill.phase() {
            DrillPhase::Running => {
                let Some(hand) = drill.current_hand() else {
                    break;
                };
                let (done, total) = drill.session().map(|s| s.progress()).unwrap_or((0, 0));
                writeln!(writer, "  {} {}", format!("{}/{}", done + 1, total).dimmed(), hand_cards(hand)).ok();

                let action = loop {
                    let answer = prompt("  Action", None, reader, writer);
                    if answer.eq_ignore_ascii_case("q") {
                        return Ok(());
                    }
                    match answer.parse::<Action>() {
                        Ok(action) => break action,
                        Err(e) => {
                            writeln!(writer, "  {}", e.to_string().red()).ok();
                        }
                    }
                };

                let feedback = drill.answer(hand, action)?;
                let message = feedback.message();
                if feedback.result.was_correct {
                    writeln!(writer, "  {}", message.green().bold()).ok();
                } else {
                    writeln!(writer, "  {}", message.red().bold()).ok();
                }
                thread::sleep(reveal_delay);
                drill.reveal(feedback.ticket);
            }
            DrillPhase::Finished => {
                if let Some(session) = drill.session() {
                    writeln!(writer, "\n{}\n", drill_summary(session)).ok();
                }
                let choice = prompt("  (c)ontinue, (r)estart or (q)uit", Some("c"), reader, writer);
                match choice.to_lowercase().as_str() {
                    "c" | "continue" => {
                        if drill.continue_drill()? == 0 {
                            writeln!(writer, "  {}", "No hands to drill.".yellow()).ok();
                            return Ok(());
                        }
                    }
                    "r" | "restart" => drill.restart(),
                    _ => return Ok(()),
                }
            }
            DrillPhase::Stopped => break,
        }
    }
    Ok(())
}
