//! Async session engine
//!
//! Wraps the deterministic [`GameState`](core::GameState) in a tokio task:
//!
//! - player commands are serialized through one channel
//! - extraction and generation run on spawned tasks and report back with the
//!   session token captured when loading began; stale results are dropped
//! - the one-second countdown and the two-second inactivity poll exist only
//!   while a puzzle is being played
//! - every history change is written to the [`HistoryStore`](services::HistoryStore)
//!
//! # Example
//!
//! ```no_run
//! use phrase_master_engine::{Engine, EngineCommand, EngineConfig};
//! use phrase_master_services::{GeminiGenerator, JsonFileStore, PlainTextExtractor};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = EngineConfig::from_env();
//! let generator = GeminiGenerator::new(config.gemini.clone())?;
//! let store = JsonFileStore::at_default_path()?;
//!
//! let (engine, updates) =
//!     Engine::new(config.seed_or_clock(), PlainTextExtractor::new(), generator, store).await;
//! let handle = engine.spawn(updates, config.max_pending_commands);
//! handle.send(EngineCommand::Upload { path: "cours.txt".into() }).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod runtime;

pub use phrase_master_core as core;
pub use phrase_master_services as services;
pub use phrase_master_types as types;

pub use config::EngineConfig;
pub use runtime::{Engine, EngineClosed, EngineCommand, EngineHandle, EngineUpdate, EngineUpdates};
