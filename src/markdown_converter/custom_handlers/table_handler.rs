//! Table rendering rules for the Markdown emitter.
//!
//! [`PlaceholderRule`] re-emits the stored markup of an isolated complex
//! table. [`SimpleTableRule`] hands every remaining `<table>` to the
//! [`SimpleTableRenderer`], which produces a column-aligned pipe table.

use std::io;
use std::rc::Rc;
use std::sync::{Arc, LazyLock};

use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use htmd::{
    Element, HtmlToMarkdown,
    element_handler::{ElementHandler, HandlerResult, Handlers},
};
use markup5ever_rcdom::{Node, SerializableHandle};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::error::{ConversionError, Result};
use crate::html_dom::{SLOT_ATTR, SlotTable};

/// Narrowest column a pipe table may have (`---`)
pub const MIN_COLUMN_WIDTH: usize = 3;

static TABLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("table").expect("BUG: hardcoded selector 'table' is statically valid")
});

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ \t]*(?:\r\n|\r|\n)+[ \t]*").expect("BUG: hardcoded regex is statically valid")
});

/// Make converted cell text safe inside a pipe-table row.
///
/// Line breaks collapse to one space, each unescaped `|` becomes `\|`, and
/// the result is trimmed.
///
/// ```rust
/// # use docx_markdown::markdown_converter::custom_handlers::escape_cell_text;
/// assert_eq!(escape_cell_text(" b|c\nd "), r"b\|c d");
/// assert_eq!(escape_cell_text(r"already \| escaped"), r"already \| escaped");
/// ```
#[must_use]
pub fn escape_cell_text(text: &str) -> String {
    let flattened = LINE_BREAKS.replace_all(text, " ");
    let mut escaped = String::with_capacity(flattened.len() + 4);
    let mut preceding_backslashes = 0usize;
    for c in flattened.chars() {
        if c == '|' && preceding_backslashes % 2 == 0 {
            escaped.push('\\');
        }
        if c == '\\' {
            preceding_backslashes += 1;
        } else {
            preceding_backslashes = 0;
        }
        escaped.push(c);
    }
    escaped.trim().to_string()
}

/// Renders one simple HTML table as a Markdown pipe table
pub struct SimpleTableRenderer {
    cell_converter: HtmlToMarkdown,
}

impl std::fmt::Debug for SimpleTableRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleTableRenderer").finish_non_exhaustive()
    }
}

impl Default for SimpleTableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleTableRenderer {
    /// Renderer whose cells use the emitter's base configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            cell_converter: super::create_cell_converter(),
        }
    }

    /// Render serialized `<table>` markup.
    ///
    /// Row 0 is the header. The column count is the longest row; shorter
    /// rows are padded with empty cells. A `<caption>` becomes a paragraph
    /// above the table. Returns an empty string for a table without rows
    /// or caption.
    ///
    /// # Errors
    ///
    /// [`ConversionError::Emitter`] if a cell cannot be converted.
    pub fn render(&self, table_markup: &str) -> Result<String> {
        let (caption, rows) = self.parse_table(table_markup)?;
        let table = format_table(&rows);
        Ok(match caption {
            Some(caption) => format!("\n{caption}\n{table}"),
            None => table,
        })
    }

    /// Converted and escaped cell text, row by row
    pub fn collect_rows(&self, table_markup: &str) -> Result<Vec<Vec<String>>> {
        self.parse_table(table_markup).map(|(_, rows)| rows)
    }

    fn parse_table(&self, table_markup: &str) -> Result<(Option<String>, Vec<Vec<String>>)> {
        let document = Html::parse_fragment(table_markup);
        let Some(table) = document.select(&TABLE_SELECTOR).next() else {
            return Ok((None, Vec::new()));
        };

        let caption = match child_elements(table).find(|e| e.value().name() == "caption") {
            Some(caption) => {
                let text = LINE_BREAKS
                    .replace_all(&self.convert_fragment(&caption.inner_html(), "caption")?, " ")
                    .trim()
                    .to_string();
                (!text.is_empty()).then_some(text)
            }
            None => None,
        };

        let mut rows = Vec::new();
        for row in table_rows(table) {
            let mut cells = Vec::new();
            for cell in child_elements(row).filter(|e| matches!(e.value().name(), "td" | "th")) {
                let markdown = self.convert_fragment(&cell.inner_html(), "table cell")?;
                cells.push(escape_cell_text(&markdown));
            }
            rows.push(cells);
        }
        Ok((caption, rows))
    }

    fn convert_fragment(&self, html: &str, what: &str) -> Result<String> {
        self.cell_converter
            .convert(html)
            .map_err(|e| ConversionError::Emitter(format!("{what}: {e}")))
    }
}

fn child_elements<'a>(parent: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    parent.children().filter_map(ElementRef::wrap)
}

/// `<tr>` elements owned by `table` itself, in order, looking through
/// `thead`/`tbody`/`tfoot` but never into cells
fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in child_elements(table) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => {
                rows.extend(child_elements(child).filter(|e| e.value().name() == "tr"));
            }
            _ => {}
        }
    }
    rows
}

fn compute_column_widths(rows: &[Vec<String>], num_columns: usize) -> Vec<usize> {
    let mut widths = vec![MIN_COLUMN_WIDTH; num_columns];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    widths
}

fn format_row_padded(row: &[String], col_widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (i, width) in col_widths.iter().enumerate() {
        let cell = row.get(i).map(String::as_str).unwrap_or_default();
        let pad = width.saturating_sub(cell.chars().count());
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(pad));
        line.push_str(" |");
    }
    line
}

fn format_separator(col_widths: &[usize]) -> String {
    let mut line = String::from("|");
    for width in col_widths {
        line.push(' ');
        line.push_str(&"-".repeat(*width));
        line.push_str(" |");
    }
    line
}

/// Lay out already-escaped rows as a pipe table wrapped in newlines
#[must_use]
pub fn format_table(rows: &[Vec<String>]) -> String {
    let Some((header, body)) = rows.split_first() else {
        return String::new();
    };
    let num_columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if num_columns == 0 {
        return String::new();
    }
    let widths = compute_column_widths(rows, num_columns);

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format_row_padded(header, &widths));
    lines.push(format_separator(&widths));
    lines.extend(body.iter().map(|row| format_row_padded(row, &widths)));

    format!("\n{}\n", lines.join("\n"))
}

/// Serialize an rcdom node back to HTML, tags included
fn serialize_node(node: &Rc<Node>) -> io::Result<String> {
    let handle: SerializableHandle = node.clone().into();
    let mut bytes = Vec::new();
    serialize(
        &mut bytes,
        &handle,
        SerializeOpts {
            traversal_scope: TraversalScope::IncludeNode,
            ..Default::default()
        },
    )?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn get_attr<'a>(attrs: &'a [html5ever::Attribute], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|a| &*a.name.local == name)
        .map(|a| &*a.value)
}

/// Emits the stored markup of an isolated table, set off by blank lines
pub struct PlaceholderRule {
    slots: Arc<SlotTable>,
}

impl PlaceholderRule {
    #[must_use]
    pub fn new(slots: Arc<SlotTable>) -> Self {
        Self { slots }
    }
}

impl ElementHandler for PlaceholderRule {
    fn handle(&self, _handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
        let slot = get_attr(element.attrs, SLOT_ATTR).and_then(|v| v.parse::<usize>().ok());
        match slot.and_then(|slot| self.slots.get(slot)) {
            Some(markup) => Some(HandlerResult::from(format!("\n\n{markup}\n\n"))),
            None => {
                warn!(?slot, "table placeholder without stored markup");
                None
            }
        }
    }
}

/// Renders every `<table>` reaching the emitter as a pipe table
pub struct SimpleTableRule {
    renderer: Arc<SimpleTableRenderer>,
}

impl SimpleTableRule {
    #[must_use]
    pub fn new(renderer: Arc<SimpleTableRenderer>) -> Self {
        Self { renderer }
    }
}

impl ElementHandler for SimpleTableRule {
    fn handle(&self, _handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
        let rendered = serialize_node(element.node)
            .map_err(|e| ConversionError::Serialization(e.to_string()))
            .and_then(|markup| self.renderer.render(&markup));
        match rendered {
            Ok(table) if table.is_empty() => {
                debug!("skipping table without rows");
                Some(HandlerResult::from(String::new()))
            }
            Ok(table) => Some(HandlerResult::from(format!("\n{table}\n"))),
            Err(e) => {
                warn!("simple table rendering failed, using default conversion: {e}");
                None
            }
        }
    }
}
