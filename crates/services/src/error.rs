use std::path::PathBuf;

use thiserror::Error;

use crate::types::SessionError;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} is not UTF-8 text", .path.display())]
    NotText { path: PathBuf },

    #[error("unsupported document type: {0}")]
    Unsupported(String),

    /// Too little usable text to build a puzzle from.
    #[error("only {chars} characters of text found (need at least {min})")]
    TooShort { chars: usize, min: usize },
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no API key configured (set PHRASE_MASTER_API_KEY or GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write history at {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode history: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("no data directory available for the history file")]
    NoDataDir,
}

impl From<ExtractionError> for SessionError {
    fn from(err: ExtractionError) -> Self {
        SessionError::Extraction(err.to_string())
    }
}

impl From<GenerationError> for SessionError {
    fn from(err: GenerationError) -> Self {
        SessionError::Generation(err.to_string())
    }
}
