//! Phrase Master (workspace facade crate).
//!
//! Re-exports the member crates under stable paths
//! (`phrase_master::{core,engine,services,types}`) and hosts the terminal
//! front end shared by the binary and the integration tests.

pub use phrase_master_core as core;
pub use phrase_master_engine as engine;
pub use phrase_master_services as services;
pub use phrase_master_types as types;

pub mod cli;
pub mod view;
