//! External collaborators of a puzzle session
//!
//! The state machine never performs I/O itself. The engine drives these
//! services and feeds their results back in:
//!
//! - [`extract`]: document -> plain text ([`TextExtractor`])
//! - [`gemini`]: text -> [`PuzzleData`](types::PuzzleData) through the Gemini
//!   REST API ([`PuzzleGenerator`])
//! - [`store`]: durable score history ([`HistoryStore`])
//!
//! Each concern is a trait so tests and alternative front ends can swap in
//! their own implementation.

pub mod decode;
pub mod error;
pub mod extract;
pub mod gemini;
pub mod prompt;
pub mod store;

pub use phrase_master_types as types;

pub use decode::decode_puzzle;
pub use error::{ExtractionError, GenerationError, StoreError};
pub use extract::{PlainTextExtractor, TextExtractor};
pub use gemini::{GeminiGenerator, GeminiSettings, PuzzleGenerator};
pub use prompt::{build_prompt, GenerationRequest};
pub use store::{default_history_path, HistoryStore, JsonFileStore, MemoryStore};
