//! Score history - bounded, newest-first list of completions
//!
//! Also computes the dashboard figures (completions, average and best time).

use serde::Serialize;

use crate::types::{Difficulty, ScoreEntry, HISTORY_CAP};

/// Aggregated progress figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub completed: usize,
    /// Mean of `time_taken`, rounded half up; 0 when empty.
    pub average_time_secs: u32,
    pub best_time_secs: Option<u32>,
    /// Completions per difficulty, indexed like [`Difficulty::ALL`].
    pub by_difficulty: [usize; 3],
}

impl HistoryStats {
    pub fn completed_at(&self, difficulty: Difficulty) -> usize {
        self.by_difficulty[difficulty_index(difficulty)]
    }
}

fn difficulty_index(difficulty: Difficulty) -> usize {
    match difficulty {
        Difficulty::Easy => 0,
        Difficulty::Medium => 1,
        Difficulty::Hard => 2,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreHistory {
    entries: Vec<ScoreEntry>,
    cap: usize,
}

impl ScoreHistory {
    /// Seed from stored entries (assumed newest first), dropping any overflow.
    pub fn new(entries: Vec<ScoreEntry>) -> Self {
        Self::with_cap(entries, HISTORY_CAP)
    }

    pub fn with_cap(mut entries: Vec<ScoreEntry>, cap: usize) -> Self {
        entries.truncate(cap);
        Self { entries, cap }
    }

    /// Prepend, then evict the oldest entries beyond the cap.
    pub fn record(&mut self, entry: ScoreEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(self.cap);
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn stats(&self) -> HistoryStats {
        let completed = self.entries.len();
        if completed == 0 {
            return HistoryStats::default();
        }

        let total: u64 = self.entries.iter().map(|e| e.time_taken as u64).sum();
        let n = completed as u64;
        let average_time_secs = ((2 * total + n) / (2 * n)) as u32;

        let mut by_difficulty = [0usize; 3];
        for e in &self.entries {
            by_difficulty[difficulty_index(e.difficulty)] += 1;
        }

        HistoryStats {
            completed,
            average_time_secs,
            best_time_secs: self.entries.iter().map(|e| e.time_taken).min(),
            by_difficulty,
        }
    }
}

impl Default for ScoreHistory {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
