//! Plain-text rendering of snapshots and events.

use std::fmt::Write as _;

use crate::core::GameSnapshot;
use crate::engine::EngineUpdate;
use crate::types::{Difficulty, GameStatus, SessionEvent, MAX_TIME_SECS};

const BAR_WIDTH: usize = 20;

/// Countdown bar, e.g. `[##########..........]`.
pub fn time_bar(progress: f32) -> String {
    let filled = ((progress.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn numbered(out: &mut String, label: &str, segments: &[String]) {
    let _ = write!(out, "{label}:");
    if segments.is_empty() {
        out.push_str(" (empty)");
    }
    for (i, s) in segments.iter().enumerate() {
        let _ = write!(out, " {})\u{a0}{}", i + 1, s.trim());
    }
    out.push('\n');
}

pub fn render_board(s: &GameSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "== {} | {} | {} concept{} ==",
        s.status.as_str(),
        s.difficulty.as_str(),
        s.selection_mode.as_str(),
        if s.target_concept.trim().is_empty() {
            String::new()
        } else {
            format!(" \"{}\"", s.target_concept.trim())
        }
    );

    match s.status {
        GameStatus::Idle => {
            out.push_str("Upload a document to start (upload FILE).\n");
            if s.has_source_text {
                out.push_str("Or type next for another puzzle from the same document.\n");
            }
        }
        GameStatus::Loading => out.push_str("Analysing the document...\n"),
        GameStatus::Playing => {
            if let Some(p) = &s.puzzle {
                let _ = writeln!(out, "Define: {}", p.concept);
            }
            let _ = writeln!(
                out,
                "{} {:>3}s   failed checks: {}",
                time_bar(s.time_progress),
                s.time_left,
                s.incorrect_attempts
            );
            if s.auto_hint_visible {
                out.push_str("* A hint was given automatically *\n");
            }
            numbered(&mut out, "Answer", &s.response);
            numbered(&mut out, "Pool  ", &s.pool);
        }
        GameStatus::Won | GameStatus::Lost => {
            if let Some(p) = &s.puzzle {
                if s.status == GameStatus::Won {
                    let _ = writeln!(
                        out,
                        "Solved \"{}\" in {}s!",
                        p.concept,
                        MAX_TIME_SECS - s.time_left
                    );
                } else {
                    let _ = writeln!(out, "Time is up for \"{}\".", p.concept);
                }
                let _ = writeln!(out, "Definition: {}", p.definition);
            }
            out.push_str("Type next for another puzzle or reset to start over.\n");
        }
    }

    if let Some(err) = &s.error {
        let _ = writeln!(out, "! {err}");
    }
    out
}

pub fn render_stats(s: &GameSnapshot) -> String {
    let stats = &s.stats;
    let mut out = String::new();
    let _ = writeln!(out, "Completed: {}", stats.completed);
    let _ = writeln!(out, "Average time: {}s", stats.average_time_secs);
    if let Some(best) = stats.best_time_secs {
        let _ = writeln!(out, "Best time: {best}s");
    }
    for d in Difficulty::ALL {
        let _ = writeln!(out, "  {:<6} {}", d.as_str(), stats.completed_at(d));
    }
    for entry in s.history.iter().take(5) {
        let _ = writeln!(
            out,
            "  {} {} ({}, {}s)",
            entry.date.format("%Y-%m-%d"),
            entry.concept,
            entry.difficulty.as_str(),
            entry.time_taken
        );
    }
    out
}

/// One-line description of an event, `None` for events the board already shows.
pub fn describe_event(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::Started { concept, segments, .. } => {
            Some(format!("New puzzle: {concept} ({segments} segments)"))
        }
        SessionEvent::IncorrectAttempt { attempts } => {
            Some(format!("Not quite. Failed checks: {attempts}"))
        }
        SessionEvent::HintApplied { automatic: true, position } => {
            Some(format!("Automatic hint: position {} fixed", position + 1))
        }
        SessionEvent::HintApplied { automatic: false, .. } => None,
        SessionEvent::Won { entry } => Some(format!("Correct! {}s", entry.time_taken)),
        SessionEvent::Lost => Some("Time is up.".to_string()),
        SessionEvent::LoadFailed { message } => Some(message.clone()),
        SessionEvent::HistoryChanged => None,
    }
}

/// Whether an update should trigger a redraw of the board.
pub fn needs_redraw(update: &EngineUpdate) -> bool {
    match update {
        EngineUpdate::Applied { changed, .. } => *changed,
        EngineUpdate::Rejected { .. } => false,
        EngineUpdate::Event(event) => matches!(
            event,
            SessionEvent::Started { .. }
                | SessionEvent::Lost
                | SessionEvent::LoadFailed { .. }
                | SessionEvent::HintApplied {
                    automatic: true,
                    ..
                }
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PuzzleData;

    #[test]
    fn time_bar_fills_proportionally() {
        assert_eq!(time_bar(1.0), format!("[{}]", "#".repeat(BAR_WIDTH)));
        assert_eq!(time_bar(0.0), format!("[{}]", ".".repeat(BAR_WIDTH)));
        assert_eq!(time_bar(0.5).matches('#').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn render_board_hides_definition_while_playing() {
        let puzzle = PuzzleData {
            concept: "Mitose".to_string(),
            definition: "La mitose est une division.".to_string(),
            segments: vec!["La mitose ".to_string(), "est une division.".to_string()],
        };
        let mut snap = GameSnapshot {
            status: GameStatus::Playing,
            puzzle: Some(puzzle),
            pool: vec!["est une division.".to_string(), "La mitose ".to_string()],
            ..GameSnapshot::default()
        };
        let board = render_board(&snap);
        assert!(board.contains("Define: Mitose"));
        assert!(board.contains("Pool"));
        assert!(!board.contains("Definition:"));

        snap.status = GameStatus::Won;
        snap.time_left = 100;
        let board = render_board(&snap);
        assert!(board.contains("in 20s"));
        assert!(board.contains("Definition: La mitose est une division."));
    }

    #[test]
    fn describe_skips_silent_events() {
        assert_eq!(describe_event(&SessionEvent::HistoryChanged), None);
        assert_eq!(
            describe_event(&SessionEvent::HintApplied {
                automatic: true,
                position: 0
            })
            .as_deref(),
            Some("Automatic hint: position 1 fixed")
        );
    }
}
