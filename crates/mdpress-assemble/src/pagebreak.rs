//! Page-break normalization.
//!
//! Authors write page breaks in several surface syntaxes; the downstream
//! converter understands exactly one. This pass rewrites every recognized
//! form to [`PAGE_BREAK_MARKER`] and touches nothing else — in particular a
//! horizontal rule without the page-break attribute stays a horizontal rule.
//! Normalizing already-canonical text is a no-op.

use std::sync::LazyLock;

use regex::Regex;

/// The single canonical marker emitted for every recognized break syntax.
pub const PAGE_BREAK_MARKER: &str = r#"<div class="page-break"></div>"#;

/// `<!-- page-break -->`
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!--\s*page-break\s*-->").unwrap());

/// `<div class="page-break"></div>` with whitespace variations.
static DIV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<div\s+class="page-break">\s*</div>"#).unwrap());

/// A fenced `page-break` block with empty body.
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^```page-break[ \t]*\r?\n```[ \t]*$").unwrap());

/// `<page-break>` custom tag (self-closing accepted).
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<page-break\s*/?>").unwrap());

/// Horizontal rule followed by a `{.page-break}` attribute line.
static RULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^---[ \t]*\r?\n[ \t]*\{\.page-break\}[ \t]*$").unwrap());

/// Rewrite all recognized page-break syntaxes to the canonical marker.
#[must_use]
pub fn normalize_page_breaks(text: &str) -> String {
    let text = COMMENT_RE.replace_all(text, PAGE_BREAK_MARKER);
    let text = FENCE_RE.replace_all(&text, PAGE_BREAK_MARKER);
    let text = TAG_RE.replace_all(&text, PAGE_BREAK_MARKER);
    let text = RULE_RE.replace_all(&text, PAGE_BREAK_MARKER);
    DIV_RE.replace_all(&text, PAGE_BREAK_MARKER).into_owned()
}
