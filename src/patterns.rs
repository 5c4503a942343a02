//! Date pattern recognition over free text.
//!
//! An ordered table of format rules is scanned against the whole document;
//! each rule pairs a regex with a fixed confidence weight and a
//! normalization function producing an ISO "YYYY[-MM[-DD]]" string.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use event_types::DateMatch;

// ── Format rule table ──────────────────────────────────────────────────
//
// Real data examples, in descending confidence:
//   1869-05-10            ISO                 1.0
//   May 10, 1869          full month name     0.95
//   May. 10, 1869         abbreviated month   0.90
//   5/10/1869             US numeric          0.85
//   10-5-1869, 10.5.1869  day-first numeric   0.80  (ambiguous with US form)
//   May 1869              month + year        0.70
//   in 1869, circa 1869   contextual year     0.50
//   1869                  bare year           0.30  (accepted range 1000-2030)

struct DateRule {
    re: Regex,
    confidence: f64,
    normalize: fn(&Captures) -> Option<String>,
}

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

/// Month name (full) → "01".."12".
fn month_number(name: &str) -> Option<usize> {
    MONTH_NAMES
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i + 1)
}

/// Three-letter month abbreviation → "01".."12".
fn month_abbrev_number(name: &str) -> Option<usize> {
    MONTH_ABBREVS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i + 1)
}

fn normalize_iso(caps: &Captures) -> Option<String> {
    Some(caps[0].to_string())
}

fn normalize_month_day_year(caps: &Captures) -> Option<String> {
    let month = month_number(&caps[1])?;
    Some(format!("{}-{:02}-{:0>2}", &caps[3], month, &caps[2]))
}

fn normalize_abbrev_day_year(caps: &Captures) -> Option<String> {
    let month = month_abbrev_number(&caps[1])?;
    Some(format!("{}-{:02}-{:0>2}", &caps[3], month, &caps[2]))
}

fn normalize_us_numeric(caps: &Captures) -> Option<String> {
    Some(format!("{}-{:0>2}-{:0>2}", &caps[3], &caps[1], &caps[2]))
}

// Interpreted day-first; genuinely ambiguous with the US form for
// inputs like "5-10-1869". Documented limitation, not resolved here.
fn normalize_day_first_numeric(caps: &Captures) -> Option<String> {
    Some(format!("{}-{:0>2}-{:0>2}", &caps[3], &caps[2], &caps[1]))
}

fn normalize_month_year(caps: &Captures) -> Option<String> {
    let month = month_number(&caps[1])?;
    Some(format!("{}-{:02}", &caps[2], month))
}

fn normalize_contextual_year(caps: &Captures) -> Option<String> {
    Some(caps[1].to_string())
}

fn normalize_bare_year(caps: &Captures) -> Option<String> {
    let year: i32 = caps[1].parse().ok()?;
    if (1000..=2030).contains(&year) {
        Some(caps[1].to_string())
    } else {
        None
    }
}

static DATE_RULES: LazyLock<Vec<DateRule>> = LazyLock::new(|| {
    let rule = |pattern: &str, confidence: f64, normalize: fn(&Captures) -> Option<String>| {
        DateRule {
            re: Regex::new(pattern).expect("date rule regex"),
            confidence,
            normalize,
        }
    };
    vec![
        rule(r"(\d{4})-(\d{2})-(\d{2})", 1.0, normalize_iso),
        rule(
            r"(?i)(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{1,2}),?\s+(\d{4})",
            0.95,
            normalize_month_day_year,
        ),
        rule(
            r"(?i)(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\.?\s+(\d{1,2}),?\s+(\d{4})",
            0.90,
            normalize_abbrev_day_year,
        ),
        rule(r"(\d{1,2})/(\d{1,2})/(\d{4})", 0.85, normalize_us_numeric),
        rule(
            r"(\d{1,2})[-.](\d{1,2})[-.](\d{4})",
            0.80,
            normalize_day_first_numeric,
        ),
        rule(
            r"(?i)(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{4})",
            0.70,
            normalize_month_year,
        ),
        rule(
            r"(?i)(?:in|during|around|circa|c\.)\s+(\d{4})",
            0.50,
            normalize_contextual_year,
        ),
        rule(r"\b(1[0-9]{3}|20[0-2][0-9])\b", 0.30, normalize_bare_year),
    ]
});

/// Find all date-like substrings in `text`, sorted by ascending byte offset.
///
/// When two rules match at the identical offset the earlier (higher
/// confidence) rule wins and the later match is discarded; matches at
/// different offsets are all retained. Candidates whose components cannot
/// be normalized are dropped without claiming their offset.
pub fn find_dates(text: &str) -> Vec<DateMatch> {
    let mut matches: Vec<DateMatch> = Vec::new();
    let mut seen_offsets: HashSet<usize> = HashSet::new();

    for rule in DATE_RULES.iter() {
        for caps in rule.re.captures_iter(text) {
            let full = caps.get(0).expect("capture 0");
            if seen_offsets.contains(&full.start()) {
                continue;
            }
            let Some(normalized) = (rule.normalize)(&caps) else {
                continue;
            };
            matches.push(DateMatch {
                raw: full.as_str().to_string(),
                normalized,
                confidence: rule.confidence,
                index: full.start(),
            });
            seen_offsets.insert(full.start());
        }
    }

    matches.sort_by_key(|m| m.index);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates_of(text: &str) -> Vec<DateMatch> {
        find_dates(text)
    }

    // ── Individual formats ───────────────────────────────────────────

    #[test]
    fn iso_format_is_passed_through() {
        let m = dates_of("Completed 1869-05-10 at the summit.");
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].raw, "1869-05-10");
        assert_eq!(m[0].normalized, "1869-05-10");
        assert_eq!(m[0].confidence, 1.0);
    }

    #[test]
    fn full_month_name_normalizes() {
        let m = dates_of("The ceremony occurred on May 10, 1869 at Promontory.");
        assert_eq!(m[0].normalized, "1869-05-10");
        assert_eq!(m[0].confidence, 0.95);
    }

    #[test]
    fn full_month_name_without_comma() {
        let m = dates_of("on December 7 1941 the fleet");
        assert_eq!(m[0].normalized, "1941-12-07");
        assert_eq!(m[0].confidence, 0.95);
    }

    #[test]
    fn abbreviated_month_with_period() {
        let m = dates_of("Signed Sep. 2, 1945 aboard the Missouri.");
        assert_eq!(m[0].normalized, "1945-09-02");
        assert_eq!(m[0].confidence, 0.90);
    }

    #[test]
    fn us_numeric_is_month_first() {
        let m = dates_of("Filed 5/10/1869 with the clerk.");
        assert_eq!(m[0].normalized, "1869-05-10");
        assert_eq!(m[0].confidence, 0.85);
    }

    #[test]
    fn dotted_numeric_is_day_first() {
        let m = dates_of("Dated 10.5.1869 in the ledger.");
        assert_eq!(m[0].normalized, "1869-05-10");
        assert_eq!(m[0].confidence, 0.80);
    }

    #[test]
    fn month_year_only() {
        let m = dates_of("Throughout May 1869 the crews raced west.");
        assert_eq!(m[0].normalized, "1869-05");
        assert_eq!(m[0].confidence, 0.70);
    }

    #[test]
    fn contextual_year() {
        let m = dates_of("The line opened circa 1869 according to records.");
        assert_eq!(m[0].confidence, 0.50);
        assert_eq!(m[0].normalized, "1869");
        assert!(m[0].raw.starts_with("circa"));
    }

    #[test]
    fn bare_year_in_range() {
        let m = dates_of("completed 1869 miles of track");
        assert_eq!(m[0].confidence, 0.30);
        assert_eq!(m[0].normalized, "1869");
    }

    #[test]
    fn bare_year_out_of_range_is_dropped() {
        assert!(dates_of("serial 2077 and part 3999").is_empty());
    }

    // ── Offset claiming and ordering ─────────────────────────────────

    #[test]
    fn higher_confidence_rule_claims_shared_offset() {
        // The bare-year rule also matches "1869" inside the ISO date at
        // the same offset; the ISO rule must win.
        let m = dates_of("1869-05-10");
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].confidence, 1.0);
    }

    #[test]
    fn contextual_and_bare_year_are_distinct_offsets() {
        // "in 1869" matches the contextual rule at "in" and the bare-year
        // rule at "1869"; different offsets, both retained.
        let m = dates_of("built in 1869 entirely");
        assert_eq!(m.len(), 2);
        assert_eq!(m[0].confidence, 0.50);
        assert_eq!(m[1].confidence, 0.30);
        assert!(m[0].index < m[1].index);
    }

    #[test]
    fn output_sorted_by_offset_with_unique_offsets() {
        let text = "First 1869-05-10, later May 12, 1869, finally in 1870.";
        let m = dates_of(text);
        for pair in m.windows(2) {
            assert!(pair[0].index < pair[1].index);
        }
    }

    #[test]
    fn mixed_formats_keep_text_order_not_confidence_order() {
        let m = dates_of("around 1850 something; then 1869-05-10 happened");
        assert!(m.len() >= 2);
        assert_eq!(m[0].confidence, 0.50);
        assert_eq!(m.last().unwrap().confidence, 1.0);
    }
}
