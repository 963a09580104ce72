//! Decoding of the generator's JSON payload into a puzzle

use serde_json::Value;

use crate::error::GenerationError;
use crate::types::PuzzleData;

/// Drop a surrounding Markdown code fence, if any.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string ("json") on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Decode raw model output into a playable puzzle.
///
/// Segments are kept verbatim (their whitespace is part of the definition);
/// only empty strings are dropped.
pub fn decode_puzzle(raw: &str) -> Result<PuzzleData, GenerationError> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| GenerationError::Malformed(format!("invalid JSON: {e}")))?;

    let Value::Object(obj) = value else {
        return Err(GenerationError::Malformed(
            "expected a JSON object".to_string(),
        ));
    };

    let concept = obj
        .get("concept")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| GenerationError::Malformed("missing concept".to_string()))?
        .to_string();

    let Some(Value::Array(items)) = obj.get("segments") else {
        return Err(GenerationError::Malformed(
            "segments must be an array".to_string(),
        ));
    };
    let mut segments = Vec::with_capacity(items.len());
    for item in items {
        match item.as_str() {
            Some("") => {}
            Some(s) => segments.push(s.to_string()),
            None => {
                return Err(GenerationError::Malformed(format!(
                    "segment is not a string: {item}"
                )))
            }
        }
    }
    if segments.is_empty() {
        return Err(GenerationError::Malformed("no segments".to_string()));
    }

    let definition = match obj.get("definition").and_then(Value::as_str) {
        Some(d) if !d.trim().is_empty() => d.to_string(),
        _ => segments.concat(),
    };
    if normalized(&definition) != normalized(&segments.concat()) {
        tracing::warn!(%concept, "segments do not reassemble the returned definition");
    }

    Ok(PuzzleData {
        concept,
        definition,
        segments,
    })
}

fn normalized(s: &str) -> String {
    s.split_whitespace().collect()
}
