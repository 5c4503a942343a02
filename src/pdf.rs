//! PDF text extraction for uploaded documents.

use std::sync::LazyLock;

use lopdf::Document;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),
}

static RE_BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Extract the text of every page, joined with blank lines.
///
/// A page whose content stream cannot be decoded contributes an empty
/// string; only a document that cannot be loaded at all is an error.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, PdfError> {
    let doc = Document::load_mem(bytes).map_err(|e| PdfError::Parse(e.to_string()))?;

    let mut pages: Vec<String> = Vec::new();
    for (&page_number, _) in doc.get_pages().iter() {
        let text = doc.extract_text(&[page_number]).unwrap_or_default();
        pages.push(text);
    }

    Ok(normalize_pages(&pages))
}

/// Join per-page text and clean it up while preserving paragraph
/// structure: CRLF normalized, 3+ blank lines collapsed, ends trimmed.
pub fn normalize_pages(pages: &[String]) -> String {
    let joined = pages.join("\n\n").replace("\r\n", "\n");
    RE_BLANK_RUNS
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_line_endings_and_blank_runs() {
        let pages = vec![
            "First page.\r\nStill first.\n\n\n\nTail.".to_string(),
            String::new(),
            "Last page.\n".to_string(),
        ];
        assert_eq!(
            normalize_pages(&pages),
            "First page.\nStill first.\n\nTail.\n\nLast page."
        );
    }

    #[test]
    fn garbage_bytes_are_a_parse_error() {
        let err = extract_pdf_text(b"definitely not a pdf").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse PDF:"));
    }
}
