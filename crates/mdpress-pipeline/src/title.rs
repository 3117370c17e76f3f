//! Document title extraction.

/// Extract a display title from document text, falling back to the filename
/// stem.
///
/// Precedence: first ATX H1 (`# Title`), then the first setext H1 (a line
/// underlined with `=`), then the stem with separators humanized and words
/// capitalized.
#[must_use]
pub fn extract_title(stem: &str, content: &str) -> String {
    for line in content.lines() {
        if let Some(rest) = line.trim().strip_prefix("# ") {
            let heading = rest.trim();
            if !heading.is_empty() {
                return heading.to_owned();
            }
        }
    }

    let lines: Vec<&str> = content.lines().collect();
    for pair in lines.windows(2) {
        let text = pair[0].trim();
        let underline = pair[1].trim();
        if !text.is_empty() && !underline.is_empty() && underline.chars().all(|c| c == '=') {
            return text.to_owned();
        }
    }

    humanize_stem(stem)
}

fn humanize_stem(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    let mut at_word_start = true;
    for c in stem.chars() {
        if c == '_' || c == '-' || c == ' ' {
            if !out.ends_with(' ') && !out.is_empty() {
                out.push(' ');
            }
            at_word_start = true;
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.push(c);
        }
    }
    let out = out.trim().to_owned();
    if out.is_empty() { stem.to_owned() } else { out }
}
