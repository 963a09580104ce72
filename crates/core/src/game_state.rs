//! Game state module - the puzzle session state machine
//!
//! `GameState` owns everything a session touches: status, settings, the
//! puzzle, the pool/response split, the countdown, the auto-hint bookkeeping
//! and the score history. Every transition is a method taking the current
//! time in milliseconds, so the whole machine is deterministic under test.
//!
//! Invariants maintained by every method:
//!
//! - pool + response always hold exactly the puzzle's segments (as a multiset)
//! - moves, hints and checks do nothing unless the status is `Playing`
//! - `time_left` only moves in [`GameState::tick`] and on session (re)start/reset
//! - the history never grows past its cap

use chrono::{DateTime, Utc};

use crate::hint::{apply_hint, correct_prefix_len, is_solved, plan_hint};
use crate::history::{HistoryStats, ScoreHistory};
use crate::rng::SegmentShuffler;
use crate::snapshot::GameSnapshot;
use crate::types::*;

/// Which kind of load is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    /// A new document: extract, then generate
    Upload,
    /// Regenerate from the text of the previous upload
    NextPuzzle,
}

/// Issued on entering `Loading`.
///
/// The caller runs the collaborators and hands the outcome back to
/// [`GameState::complete_load`] together with `token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub token: SessionToken,
    pub kind: LoadKind,
    pub difficulty: Difficulty,
    /// Concept to look for; `None` lets the generator choose.
    pub target_concept: Option<String>,
    /// Known source text (next puzzle); `None` when a document still has to be read.
    pub source_text: Option<String>,
}

/// A successful load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPuzzle {
    pub puzzle: PuzzleData,
    /// Freshly extracted text, kept for "next puzzle".
    pub source_text: Option<String>,
}

/// Result of [`GameState::check_result`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Not playing; nothing happened
    Ignored,
    Correct { time_taken: u32 },
    Incorrect { attempts: u32 },
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    status: GameStatus,
    difficulty: Difficulty,
    selection_mode: SelectionMode,
    target_concept: String,
    puzzle: Option<PuzzleData>,
    pool: Vec<String>,
    response: Vec<String>,
    time_left: u32,
    incorrect_attempts: u32,
    start_time: Option<Millis>,
    last_activity_time: Millis,
    last_auto_hint_time: Option<Millis>,
    history: ScoreHistory,
    error: Option<String>,
    /// Text of the last successful upload, reused by "next puzzle".
    extracted_text: Option<String>,
    /// Bumped on every load start and reset; stale load results are dropped.
    token: SessionToken,
    pending: Option<LoadKind>,
    shuffler: SegmentShuffler,
    /// Transition events (consumed by the engine).
    events: Vec<SessionEvent>,
}

impl GameState {
    /// Create an idle state with the given shuffle seed and an empty history
    pub fn new(seed: u32) -> Self {
        Self::with_history(seed, Vec::new())
    }

    /// Create an idle state seeded with stored score entries (newest first)
    pub fn with_history(seed: u32, history: Vec<ScoreEntry>) -> Self {
        Self {
            status: GameStatus::Idle,
            difficulty: Difficulty::default(),
            selection_mode: SelectionMode::default(),
            target_concept: String::new(),
            puzzle: None,
            pool: Vec::new(),
            response: Vec::new(),
            time_left: MAX_TIME_SECS,
            incorrect_attempts: 0,
            start_time: None,
            last_activity_time: 0,
            last_auto_hint_time: None,
            history: ScoreHistory::new(history),
            error: None,
            extracted_text: None,
            token: SessionToken::default(),
            pending: None,
            shuffler: SegmentShuffler::new(seed),
            events: Vec::new(),
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.selection_mode
    }

    pub fn target_concept(&self) -> &str {
        &self.target_concept
    }

    pub fn puzzle(&self) -> Option<&PuzzleData> {
        self.puzzle.as_ref()
    }

    pub fn pool(&self) -> &[String] {
        &self.pool
    }

    pub fn response(&self) -> &[String] {
        &self.response
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn incorrect_attempts(&self) -> u32 {
        self.incorrect_attempts
    }

    pub fn start_time(&self) -> Option<Millis> {
        self.start_time
    }

    pub fn last_activity_time(&self) -> Millis {
        self.last_activity_time
    }

    pub fn last_auto_hint_time(&self) -> Option<Millis> {
        self.last_auto_hint_time
    }

    pub fn history(&self) -> &[ScoreEntry] {
        self.history.entries()
    }

    pub fn history_stats(&self) -> HistoryStats {
        self.history.stats()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn extracted_text(&self) -> Option<&str> {
        self.extracted_text.as_deref()
    }

    pub fn session_token(&self) -> SessionToken {
        self.token
    }

    /// Length of the correctly placed prefix of the response.
    pub fn correct_prefix_len(&self) -> usize {
        self.puzzle
            .as_ref()
            .map(|p| correct_prefix_len(&self.response, &p.segments))
            .unwrap_or(0)
    }

    /// Remaining time as a fraction of the countdown ceiling.
    pub fn time_progress(&self) -> f32 {
        self.time_left as f32 / MAX_TIME_SECS as f32
    }

    /// Whether the "hint given" signal of the last automatic hint is still up.
    pub fn is_auto_hint_visible(&self, now: Millis) -> bool {
        self.last_auto_hint_time
            .is_some_and(|t| now.saturating_sub(t) < HINT_BANNER_MS)
    }

    /// Take the events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot, now: Millis) {
        out.status = self.status;
        out.difficulty = self.difficulty;
        out.selection_mode = self.selection_mode;
        out.target_concept.clone_from(&self.target_concept);
        out.puzzle.clone_from(&self.puzzle);
        out.pool.clone_from(&self.pool);
        out.response.clone_from(&self.response);
        out.time_left = self.time_left;
        out.time_progress = self.time_progress();
        out.incorrect_attempts = self.incorrect_attempts;
        out.auto_hint_visible = self.is_auto_hint_visible(now);
        out.error.clone_from(&self.error);
        out.has_source_text = self.extracted_text.is_some();
        out.session_token = self.token;
        out.history.clear();
        out.history.extend_from_slice(self.history.entries());
        out.stats = self.history.stats();
    }

    pub fn snapshot(&self, now: Millis) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s, now);
        s
    }

    // ---------------------------------------------------------------
    // Settings
    // ---------------------------------------------------------------

    /// Difficulty is fixed for the whole sequence of puzzles started from Idle.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<(), SessionError> {
        if self.status != GameStatus::Idle {
            return Err(SessionError::not_allowed("changing difficulty", self.status));
        }
        self.difficulty = difficulty;
        Ok(())
    }

    /// Takes effect at the next generation.
    pub fn set_selection_mode(&mut self, mode: SelectionMode) -> Result<(), SessionError> {
        if self.status == GameStatus::Loading {
            return Err(SessionError::not_allowed("changing selection mode", self.status));
        }
        self.selection_mode = mode;
        Ok(())
    }

    /// Takes effect at the next generation.
    pub fn set_target_concept(&mut self, concept: impl Into<String>) -> Result<(), SessionError> {
        if self.status == GameStatus::Loading {
            return Err(SessionError::not_allowed("changing target concept", self.status));
        }
        self.target_concept = concept.into();
        Ok(())
    }

    // ---------------------------------------------------------------
    // Session lifecycle
    // ---------------------------------------------------------------

    /// Idle -> Loading for a new document.
    ///
    /// Manual mode needs a non-blank concept; otherwise the error is recorded
    /// and the state stays Idle.
    pub fn begin_upload(&mut self) -> Result<LoadTicket, SessionError> {
        if self.status != GameStatus::Idle {
            return Err(SessionError::not_allowed("uploading a document", self.status));
        }
        self.error = None;

        if self.selection_mode == SelectionMode::Manual && self.target_concept.trim().is_empty() {
            let err = SessionError::InvalidInput(
                "Enter a concept before uploading the document.".to_string(),
            );
            self.error = Some(err.to_string());
            return Err(err);
        }

        Ok(self.enter_loading(LoadKind::Upload, None))
    }

    /// Won/Lost -> Loading, regenerating from the previously extracted text.
    ///
    /// Also accepted from Idle while that text survives a failed attempt.
    pub fn begin_next_puzzle(&mut self) -> Result<LoadTicket, SessionError> {
        if !(self.status.is_finished() || self.status == GameStatus::Idle) {
            return Err(SessionError::not_allowed("loading the next puzzle", self.status));
        }
        let Some(text) = self.extracted_text.clone() else {
            let err = SessionError::InvalidInput("Upload a document first.".to_string());
            self.error = Some(err.to_string());
            return Err(err);
        };
        self.error = None;

        Ok(self.enter_loading(LoadKind::NextPuzzle, Some(text)))
    }

    fn enter_loading(&mut self, kind: LoadKind, source_text: Option<String>) -> LoadTicket {
        self.clear_session();
        self.status = GameStatus::Loading;
        self.token = self.token.next();
        self.pending = Some(kind);

        LoadTicket {
            token: self.token,
            kind,
            difficulty: self.difficulty,
            target_concept: self.requested_concept(),
            source_text,
        }
    }

    fn requested_concept(&self) -> Option<String> {
        if self.selection_mode != SelectionMode::Manual {
            return None;
        }
        let concept = self.target_concept.trim();
        (!concept.is_empty()).then(|| concept.to_string())
    }

    /// Loading -> Playing or Loading -> Idle.
    ///
    /// Returns `false` (and changes nothing) when `token` is stale or no load
    /// is pending, e.g. the user reset while the generator was still running.
    pub fn complete_load(
        &mut self,
        token: SessionToken,
        result: Result<LoadedPuzzle, SessionError>,
        now: Millis,
    ) -> bool {
        if self.status != GameStatus::Loading || token != self.token {
            return false;
        }
        let kind = self.pending.take().unwrap_or(LoadKind::Upload);

        let result = result.and_then(|loaded| {
            if loaded.puzzle.segments.is_empty() {
                Err(SessionError::Generation(
                    "the puzzle has no segments".to_string(),
                ))
            } else {
                Ok(loaded)
            }
        });

        match result {
            Ok(loaded) => self.start_session(loaded, now),
            Err(err) => self.fail_load(kind, &err, now),
        }
        true
    }

    fn start_session(&mut self, loaded: LoadedPuzzle, now: Millis) {
        let LoadedPuzzle {
            puzzle,
            source_text,
        } = loaded;

        self.pool = self.shuffler.shuffled(&puzzle.segments);
        self.response.clear();
        self.time_left = MAX_TIME_SECS;
        self.incorrect_attempts = 0;
        self.start_time = Some(now);
        self.last_activity_time = now;
        self.last_auto_hint_time = None;
        self.error = None;
        if let Some(text) = source_text {
            self.extracted_text = Some(text);
        }

        self.events.push(SessionEvent::Started {
            token: self.token,
            concept: puzzle.concept.clone(),
            segments: puzzle.segments.len(),
        });
        self.puzzle = Some(puzzle);
        self.status = GameStatus::Playing;
    }

    fn fail_load(&mut self, kind: LoadKind, err: &SessionError, now: Millis) {
        let message = match kind {
            LoadKind::Upload => {
                format!("Analysis failed: {err}. Check your document or your API key.")
            }
            LoadKind::NextPuzzle => format!("Could not generate the next puzzle: {err}"),
        };

        self.clear_session();
        self.last_activity_time = now;
        self.status = GameStatus::Idle;
        self.error = Some(message.clone());
        self.events.push(SessionEvent::LoadFailed { message });
    }

    /// Any status -> Idle.
    ///
    /// Clears the session and the stored source text and invalidates any load
    /// still in flight. Settings and history are kept.
    pub fn reset(&mut self, now: Millis) {
        self.clear_session();
        self.status = GameStatus::Idle;
        self.token = self.token.next();
        self.pending = None;
        self.last_activity_time = now;
        self.extracted_text = None;
        self.error = None;
    }

    fn clear_session(&mut self) {
        self.puzzle = None;
        self.pool.clear();
        self.response.clear();
        self.time_left = MAX_TIME_SECS;
        self.incorrect_attempts = 0;
        self.start_time = None;
        self.last_auto_hint_time = None;
    }

    // ---------------------------------------------------------------
    // Playing
    // ---------------------------------------------------------------

    /// Apply a player action
    pub fn apply_action(&mut self, action: PuzzleAction, now: Millis) -> bool {
        match action {
            PuzzleAction::MoveToResponse { segment, index } => {
                self.move_to_response(&segment, index, now)
            }
            PuzzleAction::MoveToPool { segment, index } => self.move_to_pool(&segment, index, now),
            PuzzleAction::Hint => self.give_hint(false, now),
            PuzzleAction::Check => self.check_result(now) != CheckOutcome::Ignored,
        }
    }

    /// Move `pool[pool_index]` to the end of the response.
    ///
    /// No-op when not playing, when the index is out of range, or when the
    /// value there is not `segment`.
    pub fn move_to_response(&mut self, segment: &str, pool_index: usize, now: Millis) -> bool {
        if self.status != GameStatus::Playing
            || self.pool.get(pool_index).map(String::as_str) != Some(segment)
        {
            return false;
        }

        let moved = self.pool.remove(pool_index);
        self.response.push(moved);
        self.last_activity_time = now;
        self.evaluate_auto_hint(now);
        true
    }

    /// Move `response[response_index]` back to the end of the pool.
    pub fn move_to_pool(&mut self, segment: &str, response_index: usize, now: Millis) -> bool {
        if self.status != GameStatus::Playing
            || self.response.get(response_index).map(String::as_str) != Some(segment)
        {
            return false;
        }

        let moved = self.response.remove(response_index);
        self.pool.push(moved);
        self.last_activity_time = now;
        self.evaluate_auto_hint(now);
        true
    }

    /// Fix the first wrong position of the response by one move.
    ///
    /// Returns whether a segment moved. An automatic hint also resets the
    /// failed-check counter and raises the "hint given" signal.
    pub fn give_hint(&mut self, automatic: bool, now: Millis) -> bool {
        let moved = self.hint_step(automatic, now);
        if !automatic {
            self.evaluate_auto_hint(now);
        }
        moved
    }

    fn hint_step(&mut self, automatic: bool, now: Millis) -> bool {
        if self.status != GameStatus::Playing {
            return false;
        }
        let Some(puzzle) = &self.puzzle else {
            return false;
        };
        if correct_prefix_len(&self.response, &puzzle.segments) >= puzzle.segments.len() {
            return false;
        }

        let planned = plan_hint(&self.pool, &self.response, &puzzle.segments);
        if let Some(hint) = planned {
            apply_hint(&mut self.pool, &mut self.response, hint);
            self.events.push(SessionEvent::HintApplied {
                automatic,
                position: hint.target(),
            });
        }

        self.last_activity_time = now;
        if automatic {
            self.incorrect_attempts = 0;
            self.last_auto_hint_time = Some(now);
        }
        planned.is_some()
    }

    /// Compare the response to the canonical order, position by position.
    pub fn check_result(&mut self, now: Millis) -> CheckOutcome {
        if self.status != GameStatus::Playing {
            return CheckOutcome::Ignored;
        }
        let Some(puzzle) = &self.puzzle else {
            return CheckOutcome::Ignored;
        };
        self.last_activity_time = now;

        if is_solved(&self.response, &puzzle.segments) {
            let time_taken = MAX_TIME_SECS - self.time_left;
            let entry = ScoreEntry {
                id: format!("{now}-{}", self.token.value()),
                concept: puzzle.concept.clone(),
                difficulty: self.difficulty,
                time_taken,
                date: timestamp(now),
            };

            self.status = GameStatus::Won;
            self.history.record(entry.clone());
            self.events.push(SessionEvent::Won { entry });
            self.events.push(SessionEvent::HistoryChanged);
            return CheckOutcome::Correct { time_taken };
        }

        self.incorrect_attempts += 1;
        let attempts = self.incorrect_attempts;
        self.events.push(SessionEvent::IncorrectAttempt { attempts });
        self.evaluate_auto_hint(now);
        CheckOutcome::Incorrect { attempts }
    }

    // ---------------------------------------------------------------
    // Timers
    // ---------------------------------------------------------------

    /// Countdown tick: one second off the clock.
    ///
    /// Reaching zero while playing ends the session as Lost.
    pub fn tick(&mut self, now: Millis) -> bool {
        if self.status != GameStatus::Playing {
            return false;
        }

        if self.time_left <= 1 {
            self.time_left = 0;
            self.status = GameStatus::Lost;
            self.events.push(SessionEvent::Lost);
            return true;
        }

        self.time_left -= 1;
        self.evaluate_auto_hint(now);
        true
    }

    /// Whether either auto-hint trigger currently holds.
    pub fn auto_hint_due(&self, now: Millis) -> bool {
        if self.status != GameStatus::Playing {
            return false;
        }
        let inactive = now.saturating_sub(self.last_activity_time) > INACTIVITY_THRESHOLD_MS;
        inactive || self.incorrect_attempts >= ERROR_THRESHOLD
    }

    /// Fire an automatic hint if a trigger holds. Called after every mutation,
    /// on every countdown tick and by the activity poll.
    pub fn evaluate_auto_hint(&mut self, now: Millis) -> bool {
        if !self.auto_hint_due(now) {
            return false;
        }
        self.hint_step(true, now)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(1)
    }
}

fn timestamp(now: Millis) -> DateTime<Utc> {
    i64::try_from(now)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}
