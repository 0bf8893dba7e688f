//! Markdown emission for preprocessed HTML.

use std::sync::Arc;

use tracing::debug;

use super::custom_handlers::{SimpleTableRenderer, create_converter};
use super::html_preprocessing::PreparedHtml;
use crate::error::{ConversionError, Result};

/// HTML → Markdown with the placeholder and simple-table overrides.
///
/// The cell renderer is built once and shared; the per-document converter is
/// rebuilt for each call because it owns that document's slot table.
#[derive(Debug, Clone, Default)]
pub struct MarkdownEmitter {
    renderer: Arc<SimpleTableRenderer>,
}

impl MarkdownEmitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emitter sharing an existing cell renderer
    #[must_use]
    pub fn with_renderer(renderer: Arc<SimpleTableRenderer>) -> Self {
        Self { renderer }
    }

    /// Convert `prepared` to raw (not yet post-processed) Markdown.
    ///
    /// # Errors
    ///
    /// [`ConversionError::Emitter`] if the Markdown engine fails.
    pub fn emit(&self, prepared: PreparedHtml) -> Result<String> {
        let PreparedHtml { html, slots, report } = prepared;
        let converter = create_converter(Arc::new(slots), Arc::clone(&self.renderer));
        let markdown = converter
            .convert(&html)
            .map_err(|e| ConversionError::Emitter(e.to_string()))?;
        debug!(
            simple_tables = report.simple,
            complex_tables = report.complex,
            markdown_len = markdown.len(),
            "emitted Markdown"
        );
        Ok(markdown)
    }
}
