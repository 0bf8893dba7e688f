//! Final text cleanup applied to the emitter's Markdown.
//!
//! Steps always run in this order:
//! 1. title heading insertion
//! 2. removal of image references with an empty target
//! 3. un-escaping of over-escaped ordered-list markers (`1\.` → `1.`)
//! 4. blank-line collapsing
//! 5. trailing whitespace trimming
//! 6. single trailing newline

mod reference_cleanup;
mod whitespace_normalization;

#[cfg(test)]
mod tests;

pub use reference_cleanup::{remove_empty_image_references, unescape_ordered_list_markers};
pub use whitespace_normalization::{
    collapse_blank_lines, ensure_single_trailing_newline, trim_trailing_whitespace,
};

/// Prepend a level-1 heading for `title`, separated by a blank line.
///
/// ```rust
/// # use docx_markdown::markdown_converter::markdown_postprocessing::insert_title;
/// assert_eq!(insert_title("hello", "Report"), "# Report\n\nhello");
/// ```
#[must_use]
pub fn insert_title(markdown: &str, title: &str) -> String {
    format!("# {}\n\n{}", title.trim(), markdown)
}

/// Run the full post-processing chain.
///
/// `title` of `None` skips heading insertion; every other step always runs.
#[must_use]
pub fn postprocess_markdown(markdown: &str, title: Option<&str>) -> String {
    let markdown = match title {
        Some(title) => insert_title(markdown, title),
        None => markdown.to_string(),
    };
    let markdown = remove_empty_image_references(&markdown);
    let markdown = unescape_ordered_list_markers(&markdown);
    let markdown = collapse_blank_lines(&markdown);
    let markdown = trim_trailing_whitespace(&markdown);
    ensure_single_trailing_newline(&markdown)
}
