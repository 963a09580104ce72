//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! Everything here is plain data (plus serde derives for persistence), so the
//! same types travel between the state machine, the async engine, the
//! generation service and the history store.
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MAX_TIME_SECS` | 120 | Countdown ceiling for one puzzle |
//! | `TICK_MS` | 1000 | Countdown tick interval |
//! | `ACTIVITY_POLL_MS` | 2000 | Auto-hint inactivity poll interval |
//! | `INACTIVITY_THRESHOLD_MS` | 20000 | Idle time before an automatic hint |
//! | `HINT_BANNER_MS` | 5000 | How long the "hint given" signal stays up |
//!
//! # Segment Ranges by Difficulty
//!
//! | Difficulty | Segments |
//! |------------|----------|
//! | Easy | 3-5 |
//! | Medium | 6-8 |
//! | Hard | 9-12 |
//!
//! # Examples
//!
//! ```
//! use phrase_master_types::{Difficulty, GameStatus, SelectionMode};
//!
//! let difficulty = Difficulty::from_str("hard").unwrap();
//! assert_eq!(difficulty, Difficulty::Hard);
//! assert_eq!(difficulty.segment_range(), 9..=12);
//!
//! assert_eq!(SelectionMode::from_str("manual"), Some(SelectionMode::Manual));
//! assert!(GameStatus::Won.is_finished());
//! ```

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod error;

pub use error::SessionError;

/// Wall-clock timestamp in milliseconds since the Unix epoch.
pub type Millis = u64;

/// Countdown ceiling for one puzzle, in seconds.
pub const MAX_TIME_SECS: u32 = 120;

/// Countdown tick interval (one second of `time_left` per tick).
pub const TICK_MS: u64 = 1000;

/// Independent poll interval for the inactivity auto-hint.
pub const ACTIVITY_POLL_MS: u64 = 2000;

/// Inactivity span after which an automatic hint fires.
pub const INACTIVITY_THRESHOLD_MS: u64 = 20_000;

/// Failed checks after which an automatic hint fires.
pub const ERROR_THRESHOLD: u32 = 3;

/// Duration of the transient "hint given" signal after an automatic hint.
pub const HINT_BANNER_MS: u64 = 5000;

/// Maximum number of retained score entries.
pub const HISTORY_CAP: usize = 50;

/// Extracted documents shorter than this (in characters) count as unreadable.
pub const MIN_EXTRACTED_CHARS: usize = 50;

/// Upper bound on source text forwarded to the generation service.
pub const MAX_PROMPT_CHARS: usize = 10_000;

/// Puzzle difficulty - controls segmentation granularity
///
/// Coarser for Easy (fewer, longer segments), finer for Hard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Parse difficulty from string (case-insensitive)
    ///
    /// Accepts the English names and the French labels of the original game.
    ///
    /// ```
    /// use phrase_master_types::Difficulty;
    ///
    /// assert_eq!(Difficulty::from_str("Easy"), Some(Difficulty::Easy));
    /// assert_eq!(Difficulty::from_str("moyen"), Some(Difficulty::Medium));
    /// assert_eq!(Difficulty::from_str("x"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "e" | "facile" => Some(Difficulty::Easy),
            "medium" | "m" | "moyen" => Some(Difficulty::Medium),
            "hard" | "h" | "difficile" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Inclusive number of segments the generator should produce.
    pub fn segment_range(&self) -> RangeInclusive<usize> {
        match self {
            Difficulty::Easy => 3..=5,
            Difficulty::Medium => 6..=8,
            Difficulty::Hard => 9..=12,
        }
    }
}

/// How the target concept is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// The generator picks a key concept on its own
    #[default]
    Auto,
    /// The user names the concept to search for
    Manual,
}

impl SelectionMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" | "ai" => Some(SelectionMode::Auto),
            "manual" => Some(SelectionMode::Manual),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMode::Auto => "auto",
            SelectionMode::Manual => "manual",
        }
    }
}

/// Session status - drives which operations are legal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Idle,
    Loading,
    Playing,
    Won,
    Lost,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Idle => "idle",
            GameStatus::Loading => "loading",
            GameStatus::Playing => "playing",
            GameStatus::Won => "won",
            GameStatus::Lost => "lost",
        }
    }

    /// Won or Lost: the session ended and "next puzzle" is available.
    pub fn is_finished(&self) -> bool {
        matches!(self, GameStatus::Won | GameStatus::Lost)
    }
}

/// A generated puzzle
///
/// `segments` is the canonical order. Concatenated, the segments reconstruct
/// `definition`. Duplicate segment values are legal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleData {
    pub concept: String,
    pub definition: String,
    pub segments: Vec<String>,
}

/// One successful completion, as kept in the durable history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub id: String,
    pub concept: String,
    pub difficulty: Difficulty,
    /// Seconds spent on the puzzle (`MAX_TIME_SECS - time_left`).
    pub time_taken: u32,
    pub date: DateTime<Utc>,
}

/// Session-mutating player actions
///
/// Segment moves carry both the value the caller saw and its index; the index
/// is authoritative and the value guards against acting on a stale view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleAction {
    /// Move `pool[index]` to the end of the response
    MoveToResponse { segment: String, index: usize },
    /// Move `response[index]` back to the end of the pool
    MoveToPool { segment: String, index: usize },
    /// Player-requested hint
    Hint,
    /// Submit the response for a correctness check
    Check,
}

impl PuzzleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PuzzleAction::MoveToResponse { .. } => "moveToResponse",
            PuzzleAction::MoveToPool { .. } => "moveToPool",
            PuzzleAction::Hint => "hint",
            PuzzleAction::Check => "check",
        }
    }
}

/// Generation session token
///
/// Incremented every time a load starts or a session is abandoned; async
/// results carrying an older token are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SessionToken(u64);

impl SessionToken {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// Core-side events emitted by transitions, drained by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Loading -> Playing
    Started { token: SessionToken, concept: String, segments: usize },
    /// A failed check
    IncorrectAttempt { attempts: u32 },
    /// A hint moved a segment into place at `position`
    HintApplied { automatic: bool, position: usize },
    /// Playing -> Won; the entry is already in the history
    Won { entry: ScoreEntry },
    /// Playing -> Lost
    Lost,
    /// Loading -> Idle
    LoadFailed { message: String },
    /// The history list changed and should be persisted
    HistoryChanged,
}
