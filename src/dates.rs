//! Strict date-string normalization and display formatting.
//!
//! `parse_to_iso` is deliberately independent from the pattern matcher in
//! `patterns.rs` and accepts a narrower set of shapes; it backs the
//! structured parser, where a date field either parses or the whole block
//! is rejected. The two acceptance sets are pinned separately by tests and
//! must not be unified without a product decision.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use event_types::HistoricalEvent;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTH_ABBREVS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

static RE_ISO_FULL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static RE_YEAR_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").unwrap());
static RE_MONTH_DAY_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)\s+(\d{1,2}),?\s+(\d{4})$").unwrap());
static RE_ABBREV_DAY_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w{3})\.?\s+(\d{1,2}),?\s+(\d{4})$").unwrap());
static RE_US_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap());

/// Normalize a whole date string to ISO "YYYY[-MM[-DD]]".
///
/// Accepts full ISO, a bare year, "Month D, YYYY" with a full or
/// three-letter month name, and "M/D/YYYY". Anything else is `None`.
pub fn parse_to_iso(date_str: &str) -> Option<String> {
    if RE_ISO_FULL.is_match(date_str) || RE_YEAR_ONLY.is_match(date_str) {
        return Some(date_str.to_string());
    }

    if let Some(caps) = RE_MONTH_DAY_YEAR.captures(date_str)
        && let Some(pos) = MONTH_NAMES
            .iter()
            .position(|m| m.eq_ignore_ascii_case(&caps[1]))
    {
        return Some(format!("{}-{:02}-{:0>2}", &caps[3], pos + 1, &caps[2]));
    }

    if let Some(caps) = RE_ABBREV_DAY_YEAR.captures(date_str)
        && let Some(pos) = MONTH_ABBREVS
            .iter()
            .position(|m| m.eq_ignore_ascii_case(&caps[1]))
    {
        return Some(format!("{}-{:02}-{:0>2}", &caps[3], pos + 1, &caps[2]));
    }

    if let Some(caps) = RE_US_NUMERIC.captures(date_str) {
        return Some(format!("{}-{:0>2}-{:0>2}", &caps[3], &caps[1], &caps[2]));
    }

    None
}

/// "1869-05-10" → "May 10, 1869"; partial dates degrade gracefully.
pub fn format_date(iso_date: &str) -> String {
    let parts: Vec<&str> = iso_date.split('-').collect();
    let year = parts[0];
    if year.is_empty() {
        return iso_date.to_string();
    }
    if parts.len() == 1 {
        return year.to_string();
    }

    let month_name = month_name_for(parts[1], &MONTH_NAMES);
    if parts.len() == 2 {
        return format!("{month_name} {year}");
    }

    match parts[2].parse::<u32>() {
        Ok(day) => format!("{month_name} {day}, {year}"),
        Err(_) => format!("{month_name} {year}"),
    }
}

/// "1869-05-10" → "May 1869".
pub fn format_date_short(iso_date: &str) -> String {
    let parts: Vec<&str> = iso_date.split('-').collect();
    let year = parts[0];
    if year.is_empty() || parts.len() == 1 {
        return if year.is_empty() {
            iso_date.to_string()
        } else {
            year.to_string()
        };
    }
    format!("{} {year}", month_name_for(parts[1], &MONTH_ABBREVS))
}

fn month_name_for<'a>(month_part: &'a str, table: &'a [&'a str; 12]) -> &'a str {
    month_part
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| table.get(i).copied())
        .unwrap_or(month_part)
}

/// Year component of an ISO date string.
pub fn year_of(iso_date: &str) -> &str {
    iso_date.split('-').next().unwrap_or(iso_date)
}

/// Group events by their year, sorted ascending by year.
pub fn group_by_year(events: &[HistoricalEvent]) -> BTreeMap<String, Vec<&HistoricalEvent>> {
    let mut groups: BTreeMap<String, Vec<&HistoricalEvent>> = BTreeMap::new();
    for event in events {
        groups
            .entry(year_of(&event.date).to_string())
            .or_default()
            .push(event);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── parse_to_iso ─────────────────────────────────────────────────

    #[test]
    fn accepts_full_iso() {
        assert_eq!(parse_to_iso("1869-05-10").as_deref(), Some("1869-05-10"));
    }

    #[test]
    fn accepts_bare_year() {
        assert_eq!(parse_to_iso("1869").as_deref(), Some("1869"));
    }

    #[test]
    fn accepts_full_month_name() {
        assert_eq!(parse_to_iso("May 10, 1869").as_deref(), Some("1869-05-10"));
        assert_eq!(
            parse_to_iso("December 7 1941").as_deref(),
            Some("1941-12-07")
        );
    }

    #[test]
    fn accepts_abbreviated_month_with_optional_period() {
        assert_eq!(parse_to_iso("Sep. 2, 1945").as_deref(), Some("1945-09-02"));
        assert_eq!(parse_to_iso("Sep 2, 1945").as_deref(), Some("1945-09-02"));
    }

    #[test]
    fn accepts_us_numeric() {
        assert_eq!(parse_to_iso("5/10/1869").as_deref(), Some("1869-05-10"));
        assert_eq!(parse_to_iso("05/10/1869").as_deref(), Some("1869-05-10"));
    }

    #[test]
    fn rejects_everything_else() {
        assert_eq!(parse_to_iso("not a date"), None);
        assert_eq!(parse_to_iso("10-5-1869"), None);
        assert_eq!(parse_to_iso("Mayy 10, 1869"), None);
        assert_eq!(parse_to_iso(""), None);
    }

    #[test]
    fn stricter_than_the_pattern_matcher() {
        // The pattern matcher accepts day-first numerics; this parser
        // does not. The divergence is intentional.
        assert!(!crate::patterns::find_dates("10.5.1869").is_empty());
        assert_eq!(parse_to_iso("10.5.1869"), None);
    }

    // ── formatting ───────────────────────────────────────────────────

    #[test]
    fn formats_full_partial_and_year_dates() {
        assert_eq!(format_date("1869-05-10"), "May 10, 1869");
        assert_eq!(format_date("1869-05"), "May 1869");
        assert_eq!(format_date("1869"), "1869");
        assert_eq!(format_date_short("1869-05-10"), "May 1869");
        assert_eq!(format_date_short("1869"), "1869");
    }

    #[test]
    fn groups_events_by_year() {
        let ev = |id: &str, date: &str| HistoricalEvent {
            id: id.into(),
            title: id.into(),
            description: String::new(),
            date: date.into(),
            image_url: None,
            tags: None,
            source: None,
        };
        let events = vec![ev("a", "1869-05-10"), ev("b", "1870"), ev("c", "1869-11")];
        let groups = group_by_year(&events);
        assert_eq!(groups["1869"].len(), 2);
        assert_eq!(groups["1870"].len(), 1);
        let years: Vec<&String> = groups.keys().collect();
        assert_eq!(years, ["1869", "1870"]);
    }
}
