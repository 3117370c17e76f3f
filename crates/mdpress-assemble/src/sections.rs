//! Profile-conditional section filtering.
//!
//! Print profiles get a generated table of contents from the converter, so a
//! hand-written "Table of contents" section would appear twice. The filter
//! drops such sections before diagram processing.

use std::sync::LazyLock;

use regex::Regex;

/// Level-2 or level-3 "Table of contents" heading, any capitalization.
static TOC_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^#{2,3}\s+table\s+of\s+contents\s*$").unwrap());

/// Any heading up to level 3, ending a skipped section.
static SECTION_END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#{1,3}\s").unwrap());

/// Three or more consecutive blank-ish lines left by a removed section.
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n").unwrap());

/// Remove every "Table of contents" section: the heading line plus all
/// content up to the next heading of level 3 or shallower (or end of text).
#[must_use]
pub fn strip_toc_sections(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut skipping = false;
    for segment in text.split_inclusive('\n') {
        let line = segment
            .strip_suffix('\n')
            .unwrap_or(segment)
            .trim_end_matches('\r');
        if TOC_HEADING_RE.is_match(line) {
            skipping = true;
            continue;
        }
        if skipping && SECTION_END_RE.is_match(line) {
            skipping = false;
        }
        if !skipping {
            out.push_str(segment);
        }
    }
    if out.len() == text.len() {
        return out;
    }
    BLANK_RUN_RE.replace_all(&out, "\n\n").into_owned()
}
