use std::sync::LazyLock;

use regex::Regex;

use super::types::TriageError;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Symptom text after sanitization: case-folded, single-spaced, trimmed, non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    text: String,
    truncated: bool,
}

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the input exceeded the configured maximum length.
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Sanitize and normalize raw symptom text before classification.
///
/// Rejects text that is empty once invisible characters and whitespace are removed.
pub fn sanitize_symptom_text(raw: &str, max_length: usize) -> Result<NormalizedText, TriageError> {
    let text = remove_invisible_unicode(raw);
    let text = remove_control_characters(&text);
    let text = normalize_apostrophes(&text).to_lowercase();
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    let text = text.trim();

    if text.is_empty() {
        return Err(TriageError::InvalidInput(
            "symptom text is empty or whitespace-only".into(),
        ));
    }

    let truncated = text.len() > max_length;
    let text = if truncated {
        truncate_at_word_boundary(text, max_length)
    } else {
        text.to_string()
    };

    // A first character wider than `max_length` bytes truncates to nothing.
    if text.is_empty() {
        return Err(TriageError::InvalidInput(
            "symptom text is empty after truncation".into(),
        ));
    }

    Ok(NormalizedText { text, truncated })
}

/// Remove zero-width and invisible Unicode characters.
fn remove_invisible_unicode(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !matches!(
                *c,
                '\u{200B}'..='\u{200F}'  // Zero-width chars
                | '\u{202A}'..='\u{202E}' // Directional formatting
                | '\u{2060}'..='\u{2064}' // Invisible operators
                | '\u{2066}'..='\u{2069}' // Directional isolates
                | '\u{FEFF}'              // BOM
                | '\u{00AD}'              // Soft hyphen
            )
        })
        .collect()
}

/// Control characters become spaces so words on either side stay apart.
fn remove_control_characters(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

fn normalize_apostrophes(text: &str) -> String {
    text.replace(['\u{2018}', '\u{2019}', '\u{02BC}', '`'], "'")
}

/// Truncate at the last whitespace before `max` bytes, never inside a UTF-8 sequence.
fn truncate_at_word_boundary(text: &str, max: usize) -> String {
    let mut end = max.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let truncated = &text[..end];
    match truncated.rfind(' ') {
        Some(pos) if pos > 0 => truncated[..pos].to_string(),
        _ => truncated.to_string(),
    }
}
