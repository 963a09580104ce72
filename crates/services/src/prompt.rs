//! Prompt construction for puzzle generation

use std::fmt::Write as _;

use crate::types::{Difficulty, MAX_PROMPT_CHARS};

/// Everything the generator needs for one puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub text: String,
    pub difficulty: Difficulty,
    /// Concept to look for; `None` lets the model pick one.
    pub target_concept: Option<String>,
}

fn difficulty_instruction(difficulty: Difficulty) -> String {
    let range = difficulty.segment_range();
    let (lo, hi) = (range.start(), range.end());
    match difficulty {
        Difficulty::Easy => format!(
            "Pick a short, simple definition. Split it into {lo} to {hi} short segments."
        ),
        Difficulty::Medium => format!(
            "Pick a definition of standard length. Split it into {lo} to {hi} logical segments."
        ),
        Difficulty::Hard => format!(
            "Pick a long, rich and complex definition. Split it into {lo} to {hi} segments."
        ),
    }
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn clip_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn build_prompt(request: &GenerationRequest) -> String {
    let concept = request
        .target_concept
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let mut prompt = String::from("You are an expert teacher. Analyse the text below.\n");
    match concept {
        Some(c) => {
            let _ = writeln!(
                prompt,
                "Look specifically for the concept \"{c}\" in the text and extract its EXACT \
                 definition as it appears in the document."
            );
        }
        None => {
            prompt.push_str(
                "Identify an important key concept on your own and extract its exact definition.\n",
            );
        }
    }

    let _ = write!(
        prompt,
        "\nRULES:\n\
         1. {}\n\
         2. The segments, joined in order, must reproduce the definition exactly.\n\
         3. If the requested concept is not found, choose the closest concept or a very \
         important concept of the text.\n\
         4. Keep the language of the document.\n\
         \nTEXT:\n{}",
        difficulty_instruction(request.difficulty),
        clip_chars(&request.text, MAX_PROMPT_CHARS),
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(difficulty: Difficulty, concept: Option<&str>) -> GenerationRequest {
        GenerationRequest {
            text: "La mitose est une division cellulaire.".to_string(),
            difficulty,
            target_concept: concept.map(str::to_string),
        }
    }

    #[test]
    fn test_segment_range_follows_difficulty() {
        assert!(build_prompt(&request(Difficulty::Easy, None)).contains("3 to 5"));
        assert!(build_prompt(&request(Difficulty::Medium, None)).contains("6 to 8"));
        assert!(build_prompt(&request(Difficulty::Hard, None)).contains("9 to 12"));
    }

    #[test]
    fn test_target_concept_is_requested() {
        let prompt = build_prompt(&request(Difficulty::Medium, Some("  mitose ")));
        assert!(prompt.contains("\"mitose\""));

        let auto = build_prompt(&request(Difficulty::Medium, Some("   ")));
        assert!(auto.contains("on your own"));
    }

    #[test]
    fn test_source_text_is_clipped() {
        let mut req = request(Difficulty::Easy, None);
        req.text = "é".repeat(MAX_PROMPT_CHARS + 500);
        let prompt = build_prompt(&req);
        let body = prompt.split("TEXT:\n").nth(1).unwrap();
        assert_eq!(body.chars().count(), MAX_PROMPT_CHARS);
    }

    #[test]
    fn test_clip_chars_short_text_untouched() {
        assert_eq!(clip_chars("abc", 10), "abc");
        assert_eq!(clip_chars("abc", 2), "ab");
        assert_eq!(clip_chars("", 0), "");
    }
}
