//! Cleanup of emitter artifacts: dangling image references and over-escaped
//! ordered-list markers.

use regex::Regex;
use std::sync::LazyLock;

/// `![alt]()` or `![alt](   )`: an image whose target is empty.
///
/// The image sink returns an empty reference when a write fails, which the
/// emitter turns into exactly this shape. Alt text may span lines and hold
/// brackets; a `]` ends it only when `(` follows.
static EMPTY_IMAGE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[(?:[^\]]|\]+[^(\]])*\]+\(\s*\)")
        .expect("EMPTY_IMAGE_REFERENCE: hardcoded regex is valid")
});

/// A line starting with digits followed by an escaped period.
///
/// The emitter escapes `1.` in paragraph text so it does not become a list;
/// Word paragraphs that were typed with manual numbering rely on it being one.
static ESCAPED_LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*\d{1,9})\\\.")
        .expect("ESCAPED_LIST_MARKER: hardcoded regex is valid")
});

/// Remove every image reference with an empty or whitespace-only target.
///
/// ```rust
/// # use docx_markdown::markdown_converter::markdown_postprocessing::remove_empty_image_references;
/// assert_eq!(remove_empty_image_references("a ![x]() b"), "a  b");
/// assert_eq!(remove_empty_image_references("![x](images/a.png)"), "![x](images/a.png)");
/// ```
#[must_use]
pub fn remove_empty_image_references(markdown: &str) -> String {
    if !markdown.contains("![") {
        return markdown.to_string();
    }
    EMPTY_IMAGE_REFERENCE.replace_all(markdown, "").into_owned()
}

/// Normalize `12\.` at the start of a line to `12.`
#[must_use]
pub fn unescape_ordered_list_markers(markdown: &str) -> String {
    ESCAPED_LIST_MARKER.replace_all(markdown, "$1.").into_owned()
}
