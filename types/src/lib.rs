use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Parser strategy ──────────────────────────────────────────────────────

/// Which parsing algorithm to run over a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserStrategy {
    /// Date-pattern heuristics over unstructured prose.
    Regex,
    /// Labeled EVENT:/DATE:/DESCRIPTION: blocks.
    Structured,
}

impl ParserStrategy {
    pub const ALL: [ParserStrategy; 2] = [ParserStrategy::Regex, ParserStrategy::Structured];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParserStrategy::Regex => "regex",
            ParserStrategy::Structured => "structured",
        }
    }
}

impl fmt::Display for ParserStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParserStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regex" => Ok(ParserStrategy::Regex),
            "structured" => Ok(ParserStrategy::Structured),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

/// Error for a strategy name outside the recognized set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStrategy(pub String);

impl fmt::Display for UnknownStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown parser strategy: {}", self.0)
    }
}

impl std::error::Error for UnknownStrategy {}

// ── Date match ───────────────────────────────────────────────────────────

/// A date-like substring recognized in free text.
///
/// Produced and consumed within a single parse call; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateMatch {
    /// The substring as it appears in the source text.
    pub raw: String,
    /// ISO-normalized form: "YYYY", "YYYY-MM", or "YYYY-MM-DD".
    pub normalized: String,
    /// Fixed weight of the format rule that matched, in [0, 1].
    pub confidence: f64,
    /// Byte offset of the match in the source text.
    pub index: usize,
}

// ── Parsed event (pre-acceptance) ────────────────────────────────────────

/// A candidate event extracted from a document, awaiting user review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    /// ISO "YYYY[-MM[-DD]]".
    pub date: String,
    /// Extraction quality, in [0, 1]. Structured input is always 1.0.
    pub confidence: f64,
    /// The text snippet the event was extracted from.
    pub source_text: String,
}

// ── Accepted event ───────────────────────────────────────────────────────

/// An event accepted into the store, owned by exactly one location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    /// ISO "YYYY[-MM[-DD]]".
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl From<ParsedEvent> for HistoricalEvent {
    /// Acceptance conversion: `confidence` is discarded and the source
    /// snippet moves to `source`.
    fn from(ev: ParsedEvent) -> Self {
        HistoricalEvent {
            id: ev.id,
            title: ev.title,
            description: ev.description,
            date: ev.date,
            image_url: None,
            tags: None,
            source: Some(ev.source_text),
        }
    }
}

// ── Location ─────────────────────────────────────────────────────────────

/// A named point on the map with its event history.
///
/// Invariant: `events` never holds two entries with the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalLocation {
    pub id: String,
    pub name: String,
    /// (longitude, latitude), serialized as a two-element array.
    pub coordinates: (f64, f64),
    pub events: Vec<HistoricalEvent>,
}

// ── Persisted document ───────────────────────────────────────────────────

/// The single persisted document: everything the map knows, as one blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalEventsData {
    pub version: String,
    #[serde(default)]
    pub last_updated: String,
    pub locations: Vec<HistoricalLocation>,
}

impl Default for HistoricalEventsData {
    fn default() -> Self {
        HistoricalEventsData {
            version: "1.0.0".to_string(),
            last_updated: String::new(),
            locations: Vec::new(),
        }
    }
}
