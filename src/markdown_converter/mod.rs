//! Word document → Markdown conversion pipeline
//!
//! 1. An [`HtmlSource`] renders the document to HTML, handing each image to
//!    the [`ImageSink`] as it goes
//! 2. Top-level tables are classified; complex ones are isolated as opaque
//!    placeholders
//! 3. htmd emits Markdown, with placeholders restored verbatim and simple
//!    tables rendered as pipe tables
//! 4. The Markdown text is post-processed
//!
//! # Usage
//!
//! ```rust
//! # use docx_markdown::markdown_converter::convert_html_to_markdown_sync;
//! let markdown = convert_html_to_markdown_sync("<p>hello</p>", Some("Report"))?;
//! assert_eq!(markdown, "# Report\n\nhello\n");
//! # Ok::<(), docx_markdown::ConversionError>(())
//! ```

pub mod custom_handlers;
pub mod html_preprocessing;
pub mod html_to_markdown;
pub mod markdown_postprocessing;

pub use html_preprocessing::{PreparedHtml, prepare_html};
pub use html_to_markdown::MarkdownEmitter;
pub use markdown_postprocessing::postprocess_markdown;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, info};

use crate::config::ConverterConfig;
use crate::docx_source::{DocxHtmlSource, HtmlSource};
use crate::error::Result;
use crate::image_sink::{FsImageStore, ImageSink};

/// Outcome of converting one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionResult {
    pub markdown: String,
    /// Images encountered, including ones that failed to save
    pub image_count: usize,
    /// Image warnings first, then tagged source messages
    pub warnings: Vec<String>,
}

impl ConversionResult {
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Convert an HTML string to post-processed Markdown.
///
/// Runs table classification, isolation, emission and post-processing; no
/// images are extracted.
///
/// # Errors
///
/// Oversized or malformed HTML, table serialization failures and Markdown
/// engine failures.
pub fn convert_html_to_markdown_sync(html: &str, title: Option<&str>) -> Result<String> {
    let prepared = prepare_html(html)?;
    let markdown = MarkdownEmitter::new().emit(prepared)?;
    Ok(postprocess_markdown(&markdown, title))
}

/// Async wrapper around [`convert_html_to_markdown_sync`] on the blocking pool
///
/// # Errors
///
/// Conversion failures, or the blocking task panicking.
pub async fn convert_html_to_markdown(html: &str, title: Option<&str>) -> anyhow::Result<String> {
    let html = Arc::<str>::from(html);
    let title = title.map(str::to_string);

    let markdown = tokio::task::spawn_blocking(move || {
        convert_html_to_markdown_sync(&html, title.as_deref())
    })
    .await
    .map_err(|e| anyhow!("HTML-to-Markdown conversion task panicked: {e}"))??;
    Ok(markdown)
}

/// Run the whole pipeline for one document.
///
/// Images reach `sink` synchronously in document order. The result's
/// warnings hold the sink's image warnings followed by the source's
/// messages, each tagged with its severity (`[warning] ...`).
///
/// # Errors
///
/// Any fatal source, preprocessing or emission failure. Per-image failures
/// are never errors.
pub fn convert_document(
    source: &dyn HtmlSource,
    title: Option<&str>,
    sink: &mut ImageSink,
) -> Result<ConversionResult> {
    let output = source.produce(&mut |request| sink.accept(request))?;
    debug!(
        html_len = output.html.len(),
        images = sink.image_count(),
        "source rendered to HTML"
    );

    let prepared = prepare_html(&output.html)?;
    let markdown = MarkdownEmitter::new().emit(prepared)?;
    let markdown = postprocess_markdown(&markdown, title);

    let mut warnings = sink.take_warnings();
    warnings.extend(output.messages.iter().map(ToString::to_string));

    Ok(ConversionResult {
        markdown,
        image_count: sink.image_count(),
        warnings,
    })
}

/// Title and image file stem for a source path
pub(crate) fn document_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().trim().to_string())
        .unwrap_or_default()
}

/// Convert a `.docx` file, writing its images to the configured image directory.
///
/// Images are named after the file stem. The image directory must already
/// exist; see [`crate::batch`] for the variant that prepares output
/// locations and writes the `.md` file.
///
/// # Errors
///
/// I/O errors reading `path`, invalid packages and every error of
/// [`convert_document`].
pub fn convert_docx_file(path: &Path, config: &ConverterConfig) -> Result<ConversionResult> {
    convert_docx_file_with_image_base(path, config, &document_stem(path))
}

/// [`convert_docx_file`] with images named `{image_base}-image-NNN`
///
/// # Errors
///
/// As [`convert_docx_file`].
pub fn convert_docx_file_with_image_base(
    path: &Path,
    config: &ConverterConfig,
    image_base: &str,
) -> Result<ConversionResult> {
    let stem = document_stem(path);
    let mut sink = ImageSink::new(Arc::new(FsImageStore), config.image_dir_for(path), image_base)
        .with_link_dir(config.image_dir_name())
        .with_extensions(config.image_extensions());
    let title = (config.insert_title() && !stem.is_empty()).then_some(stem.as_str());

    let result = convert_document(&DocxHtmlSource::from_path(path), title, &mut sink)?;
    info!(
        path = %path.display(),
        images = result.image_count,
        warnings = result.warnings.len(),
        "converted document"
    );
    Ok(result)
}

/// [`convert_docx_file`] on the blocking pool
///
/// # Errors
///
/// Conversion failures, or the blocking task panicking.
pub async fn convert_docx_file_async(
    path: PathBuf,
    config: ConverterConfig,
) -> anyhow::Result<ConversionResult> {
    let result = tokio::task::spawn_blocking(move || convert_docx_file(&path, &config))
        .await
        .map_err(|e| anyhow!("document conversion task panicked: {e}"))??;
    Ok(result)
}
