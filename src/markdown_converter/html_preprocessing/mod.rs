//! HTML preprocessing before Markdown emission.
//!
//! Tables are classified once on the parsed source tree, complex ones are
//! swapped for placeholders, and the rewritten tree is serialized for the
//! Markdown engine together with the placeholder payloads.

pub mod table_classification;
pub mod table_isolation;

pub use table_classification::{
    ComplexityReason, TableClassification, classify_table, classify_top_level_tables,
    complexity_reason, is_top_level_table, parse_span,
};
pub use table_isolation::{IsolationReport, isolate_complex_tables};

use tracing::debug;

use crate::error::Result;
use crate::html_dom::{HtmlTree, SlotTable};

/// Source HTML rewritten for the emitter
#[derive(Debug, Clone)]
pub struct PreparedHtml {
    pub html: String,
    pub slots: SlotTable,
    pub report: IsolationReport,
}

/// Parse `html`, isolate complex tables and serialize the result.
///
/// # Errors
///
/// Propagates size, nesting and serialization failures from the parser and
/// the isolator; all of them are fatal for the document.
pub fn prepare_html(html: &str) -> Result<PreparedHtml> {
    let mut tree = HtmlTree::parse_fragment(html)?;
    let report = isolate_complex_tables(&mut tree)?;
    let (html, slots) = tree.to_html_with_slots()?;
    debug!(
        simple = report.simple,
        complex = report.complex,
        "prepared HTML for Markdown emission"
    );
    Ok(PreparedHtml { html, slots, report })
}
