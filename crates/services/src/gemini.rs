//! Gemini `generateContent` client

use std::future::Future;
use std::time::Duration;

use serde_json::{json, Value};

use crate::decode::decode_puzzle;
use crate::error::GenerationError;
use crate::prompt::{build_prompt, GenerationRequest};
use crate::types::PuzzleData;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Produces a puzzle from source text.
pub trait PuzzleGenerator: Send + Sync + 'static {
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> impl Future<Output = Result<PuzzleData, GenerationError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    client: reqwest::Client,
    settings: GeminiSettings,
}

impl GeminiGenerator {
    pub fn new(settings: GeminiSettings) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.model
        )
    }
}

/// Request body with a JSON response schema for the puzzle fields.
fn request_body(prompt: &str) -> Value {
    json!({
        "contents": [
            {
                "role": "user",
                "parts": [{ "text": prompt }]
            }
        ],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "concept": {
                        "type": "STRING",
                        "description": "Name of the extracted concept."
                    },
                    "definition": {
                        "type": "STRING",
                        "description": "Full definition of the concept."
                    },
                    "segments": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" },
                        "description": "The definition split into ordered segments."
                    }
                },
                "required": ["concept", "definition", "segments"]
            }
        }
    })
}

/// Text of the first candidate's first part.
fn candidate_text(json: &Value) -> Result<&str, GenerationError> {
    json["candidates"]
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(|candidate| candidate["content"]["parts"].as_array())
        .and_then(|parts| parts.first())
        .and_then(|part| part["text"].as_str())
        .ok_or_else(|| GenerationError::Malformed("response has no candidate text".to_string()))
}

impl PuzzleGenerator for GeminiGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<PuzzleData, GenerationError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(GenerationError::MissingApiKey)?;

        let prompt = build_prompt(&request);
        tracing::debug!(
            model = %self.settings.model,
            difficulty = request.difficulty.as_str(),
            prompt_chars = prompt.chars().count(),
            "requesting puzzle"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(&request_body(&prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read error: {e}>"));
            return Err(GenerationError::Api { status, body });
        }

        let json: Value = response.json().await?;
        let puzzle = decode_puzzle(candidate_text(&json)?)?;
        tracing::info!(concept = %puzzle.concept, segments = puzzle.segments.len(), "puzzle generated");
        Ok(puzzle)
    }
}
