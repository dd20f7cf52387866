//! Text helpers for form values.

use crate::consts::TRUNCATION_OMISSION;

/// Trims the text and collapses every whitespace run into a single space.
pub fn squish(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `limit` characters of `text`.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => text.get(..byte_index).unwrap_or(text),
        None => text,
    }
}

/// Cuts `text` to at most `limit` characters. A cut text ends with `...`, which counts towards the
/// limit.
pub fn truncate_with_omission(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let kept = limit.saturating_sub(TRUNCATION_OMISSION.chars().count());
    format!("{}{TRUNCATION_OMISSION}", truncate_chars(text, kept))
}

/// `None` for empty or whitespace-only values.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
