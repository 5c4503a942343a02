//! URL fetching and HTML-to-text extraction for document import.

use std::sync::LazyLock;
use std::time::Duration;

use regex::{Captures, Regex};
use thiserror::Error;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; HistoricalMapBot/1.0)";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
    #[error("Failed to fetch URL: {0}")]
    Upstream(String),
}

/// Fetch a page and reduce it to readable text.
///
/// One timeout-bounded request, no retries; errors are surfaced verbatim
/// to the caller with timeouts distinguished from other failures.
pub async fn fetch_text(url: &url::Url, timeout: Duration) -> Result<String, FetchError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| FetchError::Upstream(e.to_string()))?;

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify(e, timeout))?;

    if !response.status().is_success() {
        return Err(FetchError::Upstream(response.status().to_string()));
    }

    let html = response.text().await.map_err(|e| classify(e, timeout))?;
    Ok(extract_text_from_html(&html))
}

fn classify(e: reqwest::Error, timeout: Duration) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(timeout.as_secs())
    } else {
        FetchError::Upstream(e.to_string())
    }
}

// ── HTML → text ────────────────────────────────────────────────────────

static RE_SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script>").unwrap());
static RE_STYLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<style\b.*?</style>").unwrap());
static RE_NOSCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<noscript\b.*?</noscript>").unwrap());

// Block-level elements become line breaks so paragraph structure survives
// tag stripping.
static RE_BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)</?(?:p|div|br|h[1-6]|li|tr|td|th|blockquote|article|section|header|footer|nav|aside)[^>]*>",
    )
    .unwrap()
});
static RE_ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</?[^>]+(?:>|$)").unwrap());

static RE_ENTITY_NUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#(\d+);").unwrap());

static RE_HSPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static RE_LINE_LEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t]+").unwrap());
static RE_LINE_TRAILING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+\n").unwrap());
static RE_BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

const NAMED_ENTITIES: [(&str, &str); 6] = [
    (r"(?i)&nbsp;", " "),
    (r"(?i)&amp;", "&"),
    (r"(?i)&lt;", "<"),
    (r"(?i)&gt;", ">"),
    (r"(?i)&quot;", "\""),
    (r"(?i)&#39;", "'"),
];

static RE_NAMED_ENTITIES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    NAMED_ENTITIES
        .iter()
        .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), *replacement))
        .collect()
});

/// Extract readable text from HTML, preserving paragraph structure
/// through line breaks.
pub fn extract_text_from_html(html: &str) -> String {
    let text = RE_SCRIPT.replace_all(html, "");
    let text = RE_STYLE.replace_all(&text, "");
    let text = RE_NOSCRIPT.replace_all(&text, "");

    let text = RE_BLOCK_TAG.replace_all(&text, "\n");
    let mut text = RE_ANY_TAG.replace_all(&text, " ").into_owned();

    for (re, replacement) in RE_NAMED_ENTITIES.iter() {
        text = re.replace_all(&text, *replacement).into_owned();
    }
    let text = RE_ENTITY_NUM.replace_all(&text, |caps: &Captures| {
        caps[1]
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    let text = RE_HSPACE.replace_all(&text, " ");
    let text = RE_LINE_LEADING.replace_all(&text, "\n");
    let text = RE_LINE_TRAILING.replace_all(&text, "\n");
    let text = RE_BLANK_RUNS.replace_all(&text, "\n\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_styles_and_noscript_with_content() {
        let html = "<html><head><style>p { color: red }</style>\
                    <script>var x = '<p>not text</p>';</script></head>\
                    <body><noscript>enable js</noscript><p>Kept.</p></body></html>";
        assert_eq!(extract_text_from_html(html), "Kept.");
    }

    #[test]
    fn block_elements_become_line_breaks() {
        let html = "<div>First paragraph</div><div>Second paragraph</div>";
        assert_eq!(
            extract_text_from_html(html),
            "First paragraph\n\nSecond paragraph"
        );
    }

    #[test]
    fn inline_tags_are_replaced_by_spaces() {
        let html = "Driven on <b>May 10, 1869</b> at the summit";
        assert_eq!(
            extract_text_from_html(html),
            "Driven on May 10, 1869 at the summit"
        );
    }

    #[test]
    fn decodes_named_and_numeric_entities() {
        let html = "Tom &amp; Jerry &lt;3 &quot;snacks&quot; &#39;always&#39; &#8212; &nbsp;fin";
        let text = extract_text_from_html(html);
        assert!(text.starts_with("Tom & Jerry <3 \"snacks\" 'always'"));
        assert!(text.contains('\u{2014}'));
        assert!(text.ends_with("fin"));
    }

    #[test]
    fn collapses_whitespace_but_keeps_paragraph_breaks() {
        let html = "<p>one\t\t two</p>\n\n\n\n<p>   three</p>";
        assert_eq!(extract_text_from_html(html), "one two\n\nthree");
    }
}
