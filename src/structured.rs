//! Structured parser for labeled EVENT:/DATE:/DESCRIPTION: input.
//!
//! Two passes over the text: multi-line blocks and single-line
//! pipe-delimited entries, merged by title with the multi-line result
//! winning a collision. Structured input is treated as authoritative, so
//! every emitted event carries confidence 1.0.

use std::sync::LazyLock;

use regex::Regex;

use event_types::ParsedEvent;

use crate::dates::parse_to_iso;
use crate::processor::Parser;
use crate::store::generate_event_id;

// Expected multi-line shape, one block per event:
//
//   EVENT: Golden Spike Ceremony
//   DATE: May 10, 1869
//   DESCRIPTION: The First Transcontinental Railroad was completed.
//
// A block ends at a blank line, the next EVENT: line, or end of input.
// Single-line shape: EVENT: Title | DATE: 1869-05-10 | DESCRIPTION: text

static RE_EVENT_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)EVENT:\s*").unwrap());
static RE_DATE_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^DATE:\s*").unwrap());
static RE_DESC_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^DESCRIPTION:\s*").unwrap());

#[derive(Default)]
pub struct StructuredParser;

impl Parser for StructuredParser {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn description(&self) -> &'static str {
        "Parse structured EVENT:/DATE:/DESCRIPTION: format"
    }

    fn parse(&self, text: &str) -> Vec<ParsedEvent> {
        let mut events = parse_multi_line(text);

        for event in parse_single_line(text) {
            if !events.iter().any(|e| e.title == event.title) {
                events.push(event);
            }
        }

        events.sort_by(|a, b| a.date.cmp(&b.date));
        events
    }
}

/// Scan for EVENT: blocks whose next line is a DATE: line.
///
/// Blocks missing a title or date, or whose date fails normalization, are
/// skipped; the scan then resumes on the following line so a malformed
/// block never poisons the rest of the document.
fn parse_multi_line(text: &str) -> Vec<ParsedEvent> {
    let lines: Vec<&str> = text.lines().collect();
    let mut events = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let Some(label) = RE_EVENT_LABEL.find(line) else {
            i += 1;
            continue;
        };
        let title = line[label.end()..].trim();

        let Some(date_line) = lines.get(i + 1) else {
            break;
        };
        let Some(date_label) = RE_DATE_LINE.find(date_line) else {
            i += 1;
            continue;
        };
        let date_str = date_line[date_label.end()..].trim();

        if title.is_empty() || date_str.is_empty() {
            i += 1;
            continue;
        }
        let Some(normalized) = parse_to_iso(date_str) else {
            i += 1;
            continue;
        };

        // Description: everything up to a blank line, the next EVENT:
        // line, or end of input. An optional DESCRIPTION: label on the
        // first line is stripped.
        let mut j = i + 2;
        let mut desc_lines: Vec<&str> = Vec::new();
        while j < lines.len() {
            let l = lines[j];
            if l.trim().is_empty() || RE_EVENT_LABEL.is_match(l) {
                break;
            }
            desc_lines.push(l);
            j += 1;
        }

        let raw_desc = desc_lines.join("\n");
        let label_end = RE_DESC_LABEL.find(&raw_desc).map_or(0, |m| m.end());
        let description = raw_desc[label_end..].trim().to_string();

        let mut source_lines = vec![&line[label.start()..]];
        source_lines.extend(&lines[i + 1..j]);

        events.push(ParsedEvent {
            id: generate_event_id(),
            title: title.to_string(),
            description: if description.is_empty() {
                title.to_string()
            } else {
                description
            },
            date: normalized,
            confidence: 1.0,
            source_text: source_lines.join("\n").trim().to_string(),
        });

        i = j;
    }

    events
}

/// Scan for single-line pipe-delimited entries.
fn parse_single_line(text: &str) -> Vec<ParsedEvent> {
    let mut events = Vec::new();

    for line in text.lines() {
        let lower = line.to_lowercase();
        if !lower.contains("event:") || !lower.contains("date:") {
            continue;
        }

        let mut title = "";
        let mut date_str = "";
        let mut description = "";
        for part in line.split('|').map(str::trim) {
            let lp = part.to_lowercase();
            if lp.starts_with("event:") {
                title = part["event:".len()..].trim();
            } else if lp.starts_with("date:") {
                date_str = part["date:".len()..].trim();
            } else if lp.starts_with("description:") {
                description = part["description:".len()..].trim();
            }
        }

        if title.is_empty() || date_str.is_empty() {
            continue;
        }
        let Some(normalized) = parse_to_iso(date_str) else {
            continue;
        };

        events.push(ParsedEvent {
            id: generate_event_id(),
            title: title.to_string(),
            description: if description.is_empty() {
                title.to_string()
            } else {
                description.to_string()
            },
            date: normalized,
            confidence: 1.0,
            source_text: line.trim().to_string(),
        });
    }

    events
}
