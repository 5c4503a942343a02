//! Heuristic parser: dates found anywhere in unstructured prose, with
//! their surrounding sentences as event descriptions.

use std::collections::HashSet;

use event_types::ParsedEvent;

use crate::context::{extract_sentence, generate_title};
use crate::patterns::find_dates;
use crate::processor::Parser;
use crate::store::generate_event_id;

/// Matches below this confidence are too speculative to surface.
const MIN_CONFIDENCE: f64 = 0.5;

/// Sentence-prefix length used to suppress near-identical events when one
/// sentence contains several date mentions.
const DEDUP_PREFIX_CHARS: usize = 100;

#[derive(Default)]
pub struct HeuristicParser;

impl Parser for HeuristicParser {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn description(&self) -> &'static str {
        "Extract events by finding dates in text and their surrounding sentences"
    }

    fn parse(&self, text: &str) -> Vec<ParsedEvent> {
        let dates = find_dates(text);
        let mut events: Vec<ParsedEvent> = Vec::new();
        let mut seen_sentences: HashSet<String> = HashSet::new();

        for date in &dates {
            if date.confidence < MIN_CONFIDENCE {
                continue;
            }

            let sentence = extract_sentence(text, date.index);

            // One sentence, one event: only the first date in a repeated
            // sentence survives.
            let key: String = sentence.chars().take(DEDUP_PREFIX_CHARS).collect();
            if !seen_sentences.insert(key) {
                continue;
            }

            let title = generate_title(&sentence, date);
            events.push(ParsedEvent {
                id: generate_event_id(),
                title,
                description: sentence.clone(),
                date: date.normalized.clone(),
                confidence: date.confidence,
                source_text: sentence,
            });
        }

        // Chronological; the sort is stable so same-date events keep
        // their text order.
        events.sort_by(|a, b| a.date.cmp(&b.date));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<ParsedEvent> {
        HeuristicParser.parse(text)
    }

    #[test]
    fn single_sentence_yields_single_event() {
        let events = parse("The ceremony occurred on May 10, 1869 at Promontory.");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date, "1869-05-10");
        assert_eq!(events[0].confidence, 0.95);
        assert_eq!(
            events[0].description,
            "The ceremony occurred on May 10, 1869 at Promontory."
        );
        assert_eq!(events[0].source_text, events[0].description);
        assert!(events[0].id.starts_with("event-"));
    }

    #[test]
    fn low_confidence_matches_are_dropped() {
        // A bare year (0.3) is below the floor; nothing is emitted.
        let events = parse("The line carried 1869 tons of freight.");
        assert!(events.is_empty());
    }

    #[test]
    fn one_sentence_with_two_dates_emits_one_event() {
        let events =
            parse("Work ran from May 10, 1869 until June 2, 1869 at the summit without pause.");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date, "1869-05-10");
    }

    #[test]
    fn events_come_back_in_chronological_order() {
        let text = "The armistice held on November 11, 1918 across the front. \
                    War had begun on July 28, 1914 in the Balkans. \
                    The treaty followed on June 28, 1919 at Versailles.";
        let events = parse(text);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].date, "1914-07-28");
        assert_eq!(events[1].date, "1918-11-11");
        assert_eq!(events[2].date, "1919-06-28");
    }

    #[test]
    fn partial_dates_sort_before_fuller_same_year_dates() {
        let text = "It opened in 1869 to great fanfare. \
                    The spike was driven on May 10, 1869 at Promontory.";
        let events = parse(text);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].date, "1869");
        assert_eq!(events[1].date, "1869-05-10");
    }

    #[test]
    fn every_event_gets_a_distinct_id() {
        let text = "First on May 10, 1869 it opened. Then on June 2, 1870 it closed.";
        let events = parse(text);
        assert_eq!(events.len(), 2);
        assert_ne!(events[0].id, events[1].id);
    }
}
