//! Whitespace normalization for emitted Markdown.

use regex::Regex;
use std::sync::LazyLock;

/// Three or more line breaks, counting whitespace-only lines as empty
static EXCESS_BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n(?:[ \t]*\n){2,}").expect("EXCESS_BLANK_LINES: hardcoded regex is valid")
});

/// Collapse runs of 3+ newlines into a single blank line.
///
/// Idempotent: the output never contains a run this function would change.
#[must_use]
pub fn collapse_blank_lines(markdown: &str) -> String {
    EXCESS_BLANK_LINES.replace_all(markdown, "\n\n").into_owned()
}

/// Strip trailing spaces and tabs from every line
#[must_use]
pub fn trim_trailing_whitespace(markdown: &str) -> String {
    let mut result = String::with_capacity(markdown.len());
    let mut lines = markdown.split('\n').peekable();
    while let Some(line) = lines.next() {
        result.push_str(line.trim_end());
        if lines.peek().is_some() {
            result.push('\n');
        }
    }
    result
}

/// Ensure the text ends with exactly one `\n`
#[must_use]
pub fn ensure_single_trailing_newline(markdown: &str) -> String {
    let mut result = markdown.trim_end().to_string();
    result.push('\n');
    result
}
