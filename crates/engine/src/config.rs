//! Environment configuration

use std::path::PathBuf;

use crate::services::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use crate::services::{default_history_path, GeminiSettings};

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub gemini: GeminiSettings,
    /// `None` when no data directory exists and none was configured.
    pub history_path: Option<PathBuf>,
    /// Fixed shuffle seed; derived from the clock when unset.
    pub seed: Option<u32>,
    pub max_pending_commands: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gemini: GeminiSettings::default(),
            history_path: default_history_path(),
            seed: None,
            max_pending_commands: 32,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup (the process environment in
    /// [`EngineConfig::from_env`]).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .and_then(|s| if s.is_empty() { None } else { Some(s) })
        };

        let api_key = var("PHRASE_MASTER_API_KEY").or_else(|| var("GEMINI_API_KEY"));
        let model = var("PHRASE_MASTER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_base = var("PHRASE_MASTER_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let timeout_secs = var("PHRASE_MASTER_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .filter(|&secs: &u64| secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let history_path = var("PHRASE_MASTER_HISTORY_PATH")
            .map(PathBuf::from)
            .or_else(default_history_path);
        let seed = var("PHRASE_MASTER_SEED").and_then(|s| s.parse().ok());

        Self {
            gemini: GeminiSettings {
                api_key,
                model,
                api_base,
                timeout_secs,
            },
            history_path,
            seed,
            ..Self::default()
        }
    }

    /// Configured seed, or one taken from the wall clock.
    pub fn seed_or_clock(&self) -> u32 {
        self.seed
            .unwrap_or_else(|| chrono::Utc::now().timestamp_subsec_nanos() | 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = EngineConfig::from_lookup(lookup(&[]));
        assert_eq!(config.gemini.api_key, None);
        assert_eq!(config.gemini.model, DEFAULT_MODEL);
        assert_eq!(config.gemini.api_base, DEFAULT_API_BASE);
        assert_eq!(config.gemini.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.seed, None);
        assert_eq!(config.history_path, default_history_path());
    }

    #[test]
    fn test_reads_overrides() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("PHRASE_MASTER_API_KEY", " key-1 "),
            ("GEMINI_API_KEY", "key-2"),
            ("PHRASE_MASTER_MODEL", "gemini-test"),
            ("PHRASE_MASTER_TIMEOUT_SECS", "5"),
            ("PHRASE_MASTER_HISTORY_PATH", "/tmp/h.json"),
            ("PHRASE_MASTER_SEED", "77"),
        ]));
        assert_eq!(config.gemini.api_key.as_deref(), Some("key-1"));
        assert_eq!(config.gemini.model, "gemini-test");
        assert_eq!(config.gemini.timeout_secs, 5);
        assert_eq!(config.history_path, Some(PathBuf::from("/tmp/h.json")));
        assert_eq!(config.seed, Some(77));
        assert_eq!(config.seed_or_clock(), 77);
    }

    #[test]
    fn test_gemini_key_fallback_and_bad_numbers() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("PHRASE_MASTER_API_KEY", "  "),
            ("GEMINI_API_KEY", "fallback"),
            ("PHRASE_MASTER_TIMEOUT_SECS", "0"),
            ("PHRASE_MASTER_SEED", "abc"),
        ]));
        assert_eq!(config.gemini.api_key.as_deref(), Some("fallback"));
        assert_eq!(config.gemini.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.seed, None);
    }
}
