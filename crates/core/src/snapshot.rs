use serde::Serialize;

use crate::history::HistoryStats;
use crate::types::{
    Difficulty, GameStatus, PuzzleData, ScoreEntry, SelectionMode, SessionToken, MAX_TIME_SECS,
};

/// Read model of a session, published after every transition.
///
/// Carries the full puzzle (definition included); it is up to the presenter
/// to hold the definition back while a session is still being played.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub status: GameStatus,
    pub difficulty: Difficulty,
    pub selection_mode: SelectionMode,
    pub target_concept: String,
    pub puzzle: Option<PuzzleData>,
    pub pool: Vec<String>,
    pub response: Vec<String>,
    pub time_left: u32,
    pub time_progress: f32,
    pub incorrect_attempts: u32,
    pub auto_hint_visible: bool,
    pub error: Option<String>,
    /// Whether "next puzzle" has text to work from.
    pub has_source_text: bool,
    pub session_token: SessionToken,
    pub history: Vec<ScoreEntry>,
    pub stats: HistoryStats,
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            status: GameStatus::Idle,
            difficulty: Difficulty::default(),
            selection_mode: SelectionMode::default(),
            target_concept: String::new(),
            puzzle: None,
            pool: Vec::new(),
            response: Vec::new(),
            time_left: MAX_TIME_SECS,
            time_progress: 1.0,
            incorrect_attempts: 0,
            auto_hint_visible: false,
            error: None,
            has_source_text: false,
            session_token: SessionToken::default(),
            history: Vec::new(),
            stats: HistoryStats::default(),
        }
    }
}
