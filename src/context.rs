//! Sentence-context extraction and title derivation for matched dates.

use std::sync::LazyLock;

use regex::Regex;

use event_types::DateMatch;

/// Fallback label when a sentence is nothing but its date.
pub const DEFAULT_TITLE: &str = "Historical Event";

/// Sentences longer than this are replaced by a window around the date.
const MAX_SENTENCE_BYTES: usize = 300;

/// Largest char offset at or below `index` that is a char boundary.
fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Extract the sentence surrounding the date at byte offset `date_index`.
///
/// Scans for the nearest sentence terminators (`.`, `!`, `?`) before and
/// after the offset. Over-long sentences are bounded by a -100/+200 byte
/// window around the date, marked with a trailing ellipsis.
pub fn extract_sentence(text: &str, date_index: usize) -> String {
    let mut start = 0;
    let mut end = text.len();

    for (i, ch) in text.char_indices() {
        if matches!(ch, '.' | '!' | '?') {
            if i < date_index {
                start = i + 1;
            } else {
                end = i + 1;
                break;
            }
        }
    }

    let sentence = text[start..end].trim();
    if sentence.len() > MAX_SENTENCE_BYTES {
        let w_start = floor_char_boundary(text, date_index.saturating_sub(100));
        let w_end = floor_char_boundary(text, (date_index + 200).min(text.len()));
        format!("{}...", text[w_start..w_end].trim())
    } else {
        sentence.to_string()
    }
}

// Single-pass strips, matching one leading/trailing punctuation run only.
static RE_TITLE_LEAD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[,\-:]+\s*").unwrap());
static RE_TITLE_TRAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,\-:]+\s*$").unwrap());

/// Derive a short label from a sentence with its date removed.
///
/// Takes the first 8 whitespace tokens, strips stray leading/trailing
/// punctuation, capitalizes, and caps the result at 60 chars.
pub fn generate_title(sentence: &str, date: &DateMatch) -> String {
    let without_date = sentence.replacen(date.raw.as_str(), "", 1);
    let words: Vec<&str> = without_date.split_whitespace().take(8).collect();
    let joined = words.join(" ");

    let stripped = RE_TITLE_LEAD.replace(&joined, "");
    let stripped = RE_TITLE_TRAIL.replace(&stripped, "");

    let mut chars = stripped.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    };

    let title = if capitalized.chars().count() > 60 {
        let head: String = capitalized.chars().take(57).collect();
        format!("{head}...")
    } else {
        capitalized
    };

    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date_at(text: &str, raw: &str) -> DateMatch {
        DateMatch {
            raw: raw.to_string(),
            normalized: String::new(),
            confidence: 1.0,
            index: text.find(raw).expect("raw date present"),
        }
    }

    // ── extract_sentence ─────────────────────────────────────────────

    #[test]
    fn extracts_the_enclosing_sentence() {
        let text = "Work began early. The ceremony occurred on May 10, 1869 at Promontory. Crowds cheered.";
        let idx = text.find("May").unwrap();
        assert_eq!(
            extract_sentence(text, idx),
            "The ceremony occurred on May 10, 1869 at Promontory."
        );
    }

    #[test]
    fn whole_text_when_no_terminators() {
        let text = "completed on May 10, 1869 without punctuation";
        let idx = text.find("May").unwrap();
        assert_eq!(extract_sentence(text, idx), text);
    }

    #[test]
    fn first_sentence_has_no_preceding_terminator() {
        let text = "In 1869 the line was joined. More followed.";
        assert_eq!(extract_sentence(text, 3), "In 1869 the line was joined.");
    }

    #[test]
    fn long_sentence_is_windowed_with_ellipsis() {
        let filler = "x".repeat(250);
        let text = format!("{filler} May 10, 1869 {filler}.");
        let idx = text.find("May").unwrap();
        let result = extract_sentence(&text, idx);
        assert!(result.ends_with("..."));
        assert!(result.len() <= 100 + 200 + 3);
        assert!(result.contains("May 10, 1869"));
    }

    // ── generate_title ───────────────────────────────────────────────

    #[test]
    fn takes_first_eight_words_without_the_date() {
        let text = "The ceremony occurred on May 10, 1869 at Promontory Summit in Utah Territory";
        let date = date_at(text, "May 10, 1869");
        assert_eq!(
            generate_title(text, &date),
            "The ceremony occurred on at Promontory Summit in"
        );
    }

    #[test]
    fn strips_leading_punctuation_and_capitalizes() {
        let text = "- on May 10, 1869 the spike was driven";
        let date = date_at(text, "May 10, 1869");
        assert_eq!(generate_title(text, &date), "On the spike was driven");
    }

    #[test]
    fn caps_length_at_sixty_chars() {
        let text = "Extraordinarily long commemorative proclamation regarding the tremendous achievement in 1869";
        let date = date_at(text, "1869");
        let title = generate_title(text, &date);
        assert_eq!(title.chars().count(), 60);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn falls_back_when_nothing_remains() {
        let text = "May 10, 1869";
        let date = date_at(text, "May 10, 1869");
        assert_eq!(generate_title(text, &date), DEFAULT_TITLE);
    }
}
