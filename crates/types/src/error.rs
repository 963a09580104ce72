use thiserror::Error;

use crate::GameStatus;

/// Recoverable failures surfaced by session transitions.
///
/// None of these are fatal: every path leaves the session in a legal state
/// and the `Display` text doubles as the user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Bad user input (e.g. Manual mode with no concept); no transition happens.
    #[error("{0}")]
    InvalidInput(String),

    /// The document could not be turned into usable text.
    #[error("could not read the document: {0}")]
    Extraction(String),

    /// The generation service failed or returned an unusable puzzle.
    #[error("could not generate a puzzle: {0}")]
    Generation(String),

    /// The operation is not legal in the current status.
    #[error("{action} is not available while {status}")]
    NotAllowed {
        action: &'static str,
        status: &'static str,
    },
}

impl SessionError {
    pub fn not_allowed(action: &'static str, status: GameStatus) -> Self {
        SessionError::NotAllowed {
            action,
            status: status.as_str(),
        }
    }
}
