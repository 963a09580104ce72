//! Core session logic - pure, deterministic, and testable
//!
//! This crate contains the rules of the definition puzzle: the session state
//! machine, the hint engine, segment shuffling and the bounded score history.
//! It has **no dependencies** on timers, networking, or I/O:
//!
//! - **Deterministic**: the same seed shuffles the same way, and every
//!   transition takes the current time as an argument
//! - **Testable**: timers are driven by calling [`GameState::tick`] and
//!   [`GameState::evaluate_auto_hint`] with whatever clock the test wants
//! - **Portable**: the async engine, a CLI or a test harness all drive the
//!   same state
//!
//! # Module Structure
//!
//! - [`game_state`]: status machine, moves, checks, countdown and auto-hint
//! - [`hint`]: first-mismatch search and the single corrective move
//! - [`history`]: newest-first score list capped at 50, plus dashboard figures
//! - [`rng`]: LCG + Fisher-Yates shuffle that avoids the canonical order
//! - [`snapshot`]: serializable read model
//!
//! # Rules
//!
//! - A puzzle is a definition split into ordered segments; the player rebuilds
//!   it by moving segments from the shuffled pool into the response
//! - Correctness is positional: the response must equal the segment list
//! - A hint moves exactly one segment so the first wrong position becomes right
//! - An automatic hint fires after 20 s without activity or after 3 failed
//!   checks, and clears the failed-check counter
//! - The countdown starts at 120 s; reaching zero loses the puzzle
//!
//! # Example
//!
//! ```
//! use phrase_master_core::{GameState, LoadedPuzzle};
//! use phrase_master_types::{GameStatus, PuzzleData, PuzzleAction};
//!
//! let mut game = GameState::new(12345);
//! let ticket = game.begin_upload().unwrap();
//!
//! let puzzle = PuzzleData {
//!     concept: "Osmose".to_string(),
//!     definition: "Diffusion de l'eau.".to_string(),
//!     segments: vec!["Diffusion ".to_string(), "de l'eau.".to_string()],
//! };
//! let loaded = LoadedPuzzle { puzzle, source_text: None };
//! assert!(game.complete_load(ticket.token, Ok(loaded), 0));
//! assert_eq!(game.status(), GameStatus::Playing);
//!
//! // Two hints place both segments.
//! game.apply_action(PuzzleAction::Hint, 1);
//! game.apply_action(PuzzleAction::Hint, 2);
//! game.apply_action(PuzzleAction::Check, 3);
//! assert_eq!(game.status(), GameStatus::Won);
//! assert_eq!(game.history().len(), 1);
//! ```

pub mod game_state;
pub mod hint;
pub mod history;
pub mod rng;
pub mod snapshot;

pub use phrase_master_types as types;

// Re-export commonly used types for convenience
pub use game_state::{CheckOutcome, GameState, LoadKind, LoadTicket, LoadedPuzzle};
pub use hint::{correct_prefix_len, is_solved, plan_hint, HintMove};
pub use history::{HistoryStats, ScoreHistory};
pub use rng::{SegmentShuffler, SimpleRng};
pub use snapshot::GameSnapshot;
