//! Parser strategy dispatch.
//!
//! The processor is constructed by the caller (CLI command or server
//! state) and passed down explicitly; there is no ambient global to
//! configure or reset.

use event_types::{ParsedEvent, ParserStrategy};

use crate::heuristic::HeuristicParser;
use crate::structured::StructuredParser;

/// A parsing algorithm turning raw text into candidate events.
pub trait Parser {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn parse(&self, text: &str) -> Vec<ParsedEvent>;
}

/// Synchronous document processing surface.
///
/// A single dispatch point so a job-queue implementation could be swapped
/// in behind the same trait.
pub trait EventProcessor {
    fn parse_sync(&self, text: &str, strategy: ParserStrategy) -> Vec<ParsedEvent>;
}

/// In-process implementation owning one instance of each strategy.
#[derive(Default)]
pub struct LocalProcessor {
    heuristic: HeuristicParser,
    structured: StructuredParser,
}

impl LocalProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parser_for(&self, strategy: ParserStrategy) -> &dyn Parser {
        match strategy {
            ParserStrategy::Regex => &self.heuristic,
            ParserStrategy::Structured => &self.structured,
        }
    }

    /// (name, description) pairs for every available strategy.
    pub fn strategies(&self) -> Vec<(&'static str, &'static str)> {
        ParserStrategy::ALL
            .iter()
            .map(|s| {
                let p = self.parser_for(*s);
                (p.name(), p.description())
            })
            .collect()
    }
}

impl EventProcessor for LocalProcessor {
    fn parse_sync(&self, text: &str, strategy: ParserStrategy) -> Vec<ParsedEvent> {
        self.parser_for(strategy).parse(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_to_the_requested_strategy() {
        let processor = LocalProcessor::new();
        let text = "EVENT: Golden Spike\nDATE: 1869-05-10\nDESCRIPTION: Railroad completed.";

        let structured = processor.parse_sync(text, ParserStrategy::Structured);
        assert_eq!(structured.len(), 1);
        assert_eq!(structured[0].confidence, 1.0);

        // The heuristic parser sees the same text differently.
        let heuristic = processor.parse_sync(text, ParserStrategy::Regex);
        assert!(!heuristic.is_empty());
        assert!(heuristic[0].confidence < 1.01);
    }

    #[test]
    fn lists_both_strategies() {
        let processor = LocalProcessor::new();
        let names: Vec<&str> = processor.strategies().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["regex", "structured"]);
    }
}
