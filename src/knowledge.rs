//! Knowledge-base answers returned by the dialogue platform.
//!
//! Document-matched answers may arrive as a small transcript
//! (`"Q: ...\nA: ..."`). Only the answer segment is sent back to the user.

use std::sync::LazyLock;

use regex::Regex;

/// First `A:` segment, up to the next `Q:` marker or the end of the text.
static ANSWER_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(?:^|\n)\s*A:\s*(.*?)\s*(?:\n\s*Q:|$)").expect("Invalid answer regex")
});

/// Leading question line when no answer marker is present.
static QUESTION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*Q:[^\n]*\n").expect("Invalid question regex"));

/// Strip transcript markers from a knowledge answer.
///
/// Returns `None` when nothing but whitespace remains, so callers can fall
/// through to the other dispatch paths.
pub fn extract_answer(raw: &str) -> Option<String> {
    let answer = match ANSWER_SEGMENT.captures(raw) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()).to_string(),
        None => QUESTION_PREFIX.replace(raw, "").into_owned(),
    };

    let answer = answer.trim();
    if answer.is_empty() {
        None
    } else {
        Some(answer.to_string())
    }
}
