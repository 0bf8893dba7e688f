//! WordprocessingML body → HTML.
//!
//! Walks `w:body` in document order and writes an HTML fragment the
//! preprocessing stages understand. Images are handed to the caller's
//! callback the moment they are reached, so ordinals follow document order.

use std::fmt::Write as _;

use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::debug;

use super::numbering::{ListKind, Numbering, Styles};
use super::package::{ContentTypes, Package, Relationships};
use super::xml::{XmlElement, is_toggle_on};
use super::{Severity, SourceMessage};
use crate::error::Result;
use crate::image_sink::{EmbeddedImage, ImageReference, ImageRequest};

/// Parts the body refers to
pub(super) struct PartContext {
    pub rels: Relationships,
    pub content_types: ContentTypes,
    pub numbering: Numbering,
    pub styles: Styles,
}

pub(super) struct DocumentWriter<'a, 'cb> {
    package: Package<'a>,
    parts: PartContext,
    images: &'cb mut dyn FnMut(ImageRequest) -> ImageReference,
    messages: Vec<SourceMessage>,
    image_calls: usize,
}

impl<'a, 'cb> DocumentWriter<'a, 'cb> {
    pub fn new(
        package: Package<'a>,
        parts: PartContext,
        images: &'cb mut dyn FnMut(ImageRequest) -> ImageReference,
    ) -> Self {
        Self {
            package,
            parts,
            images,
            messages: Vec::new(),
            image_calls: 0,
        }
    }

    /// Render `body` and hand back the HTML plus collected messages
    pub fn write_body(mut self, body: &XmlElement) -> Result<(String, Vec<SourceMessage>)> {
        let mut html = String::new();
        self.write_blocks(body, &mut html)?;
        debug!(
            html_len = html.len(),
            images = self.image_calls,
            messages = self.messages.len(),
            "rendered document body"
        );
        Ok((html, self.messages))
    }

    /// Record a message once; repeated notes about the same feature collapse
    pub fn note(&mut self, severity: Severity, text: impl Into<String>) {
        let message = SourceMessage {
            severity,
            text: text.into(),
        };
        if !self.messages.contains(&message) {
            self.messages.push(message);
        }
    }

    fn write_blocks(&mut self, container: &XmlElement, out: &mut String) -> Result<()> {
        let mut lists = ListStack::default();
        for element in container.elements() {
            self.write_block(element, &mut lists, out)?;
        }
        lists.close_all(out);
        Ok(())
    }

    fn write_block(
        &mut self,
        element: &XmlElement,
        lists: &mut ListStack,
        out: &mut String,
    ) -> Result<()> {
        match element.name.as_str() {
            "p" => self.write_paragraph(element, lists, out)?,
            "tbl" => {
                lists.close_all(out);
                self.write_table(element, out)?;
            }
            // Content controls and custom XML wrap ordinary blocks
            "sdt" => {
                if let Some(content) = element.child("sdtContent") {
                    for child in content.elements() {
                        self.write_block(child, lists, out)?;
                    }
                }
            }
            "customXml" => {
                for child in element.elements() {
                    self.write_block(child, lists, out)?;
                }
            }
            "oMathPara" | "oMath" => {
                self.note(Severity::Warning, "Equations are not supported and were skipped");
            }
            _ => {}
        }
        Ok(())
    }

    fn write_paragraph(
        &mut self,
        paragraph: &XmlElement,
        lists: &mut ListStack,
        out: &mut String,
    ) -> Result<()> {
        let properties = paragraph.child("pPr");
        let heading = properties
            .and_then(|pr| pr.child_val("pStyle"))
            .and_then(|style| self.parts.styles.heading_level(style));
        let list_item = properties.and_then(|pr| pr.child("numPr")).and_then(|num| {
            let num_id = num.child_val("numId")?;
            // numId 0 removes inherited numbering
            if num_id == "0" {
                return None;
            }
            let ilvl = num
                .child_val("ilvl")
                .and_then(|v| v.parse::<u8>().ok())
                .unwrap_or(0);
            Some((num_id.to_string(), ilvl))
        });

        let mut inline = InlineWriter::default();
        self.write_inline(paragraph, &mut inline)?;
        let content = inline.finish();

        match (heading, list_item) {
            (None, Some((num_id, ilvl))) => {
                let kind = self.parts.numbering.list_kind(&num_id, ilvl);
                lists.enter(usize::from(ilvl) + 1, kind, out);
                out.push_str(&content);
            }
            (Some(level), _) => {
                lists.close_all(out);
                if !content.trim().is_empty() {
                    let _ = write!(out, "<h{level}>{content}</h{level}>");
                }
            }
            (None, None) => {
                lists.close_all(out);
                if !content.trim().is_empty() {
                    let _ = write!(out, "<p>{content}</p>");
                }
            }
        }
        Ok(())
    }

    fn write_inline(&mut self, parent: &XmlElement, writer: &mut InlineWriter) -> Result<()> {
        for element in parent.elements() {
            match element.name.as_str() {
                "r" => self.write_run(element, writer)?,
                "hyperlink" => self.write_hyperlink(element, writer)?,
                "ins" | "smartTag" | "customXml" | "fldSimple" => {
                    self.write_inline(element, writer)?;
                }
                "sdt" => {
                    if let Some(content) = element.child("sdtContent") {
                        self.write_inline(content, writer)?;
                    }
                }
                "oMath" | "oMathPara" => {
                    self.note(Severity::Warning, "Equations are not supported and were skipped");
                }
                // "del" and "moveFrom" hold tracked deletions
                _ => {}
            }
        }
        Ok(())
    }

    fn write_hyperlink(&mut self, link: &XmlElement, writer: &mut InlineWriter) -> Result<()> {
        let href = link
            .attr("id")
            .and_then(|id| self.parts.rels.get(id))
            .map(|rel| rel.target.clone())
            .or_else(|| link.attr("anchor").map(|anchor| format!("#{anchor}")));

        let Some(href) = href else {
            return self.write_inline(link, writer);
        };
        writer.markup(&format!(
            "<a href=\"{}\">",
            encode_double_quoted_attribute(&href)
        ));
        self.write_inline(link, writer)?;
        writer.markup("</a>");
        Ok(())
    }

    fn write_run(&mut self, run: &XmlElement, writer: &mut InlineWriter) -> Result<()> {
        let format = RunFormat::from_properties(run.child("rPr"));
        for child in run.elements() {
            match child.name.as_str() {
                "t" => writer.text(format, &child.text()),
                "tab" => writer.text(format, "\t"),
                "noBreakHyphen" => writer.text(format, "-"),
                "br" | "cr" => {
                    if !matches!(child.attr("type"), Some("page" | "column")) {
                        writer.formatted_markup(format, "<br>");
                    }
                }
                "drawing" => self.write_drawing(child, writer),
                "pict" => self.write_pict(child, writer),
                "AlternateContent" => {
                    let chosen = child.child("Choice").or_else(|| child.child("Fallback"));
                    if let Some(chosen) = chosen {
                        self.write_run(chosen, writer)?;
                    }
                }
                "object" => {
                    self.note(
                        Severity::Warning,
                        "Embedded OLE objects are not supported and were skipped",
                    );
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn write_drawing(&mut self, drawing: &XmlElement, writer: &mut InlineWriter) {
        let Some(blip) = drawing.find("blip") else {
            if drawing.find("chart").is_some() {
                self.note(Severity::Warning, "Charts are not supported and were skipped");
            }
            return;
        };
        let alt = drawing
            .find("docPr")
            .and_then(|pr| pr.attr("descr").or_else(|| pr.attr("title")))
            .filter(|alt| !alt.trim().is_empty());

        match (blip.attr("embed"), blip.attr("link")) {
            (Some(rel_id), _) => self.write_image(rel_id, alt, writer),
            (None, Some(_)) => self.note(
                Severity::Warning,
                "Linked images are not embedded in the document and were skipped",
            ),
            (None, None) => {}
        }
    }

    fn write_pict(&mut self, pict: &XmlElement, writer: &mut InlineWriter) {
        let Some(image_data) = pict.find("imagedata") else {
            return;
        };
        let alt = image_data.attr("title").filter(|alt| !alt.trim().is_empty());
        if let Some(rel_id) = image_data.attr("id") {
            self.write_image(rel_id, alt, writer);
        }
    }

    fn write_image(&mut self, rel_id: &str, alt: Option<&str>, writer: &mut InlineWriter) {
        let Some(request) = self.image_request(rel_id, alt) else {
            return;
        };
        self.image_calls += 1;
        let reference = (self.images)(request);
        // An unsaved image keeps no alt text so it leaves a bare `![]()`
        let alt = if reference.is_empty() { "" } else { alt.unwrap_or_default() };
        writer.markup(&format!(
            "<img src=\"{}\" alt=\"{}\">",
            encode_double_quoted_attribute(&reference.reference_path),
            encode_double_quoted_attribute(alt)
        ));
    }

    /// `None` for images that are linked rather than embedded
    fn image_request(&mut self, rel_id: &str, alt: Option<&str>) -> Option<ImageRequest> {
        let Some(rel) = self.parts.rels.get(rel_id).cloned() else {
            return Some(Err(format!("relationship {rel_id} not found")));
        };
        if rel.external {
            self.note(
                Severity::Warning,
                "Linked images are not embedded in the document and were skipped",
            );
            return None;
        }
        let request = match self.package.read_bytes(&rel.target) {
            Ok(Some(bytes)) => Ok(EmbeddedImage {
                bytes,
                content_type: self.parts.content_types.lookup(&rel.target),
                alt_text: alt.map(str::to_string),
            }),
            Ok(None) => Err(format!("media part {} is missing", rel.target)),
            Err(e) => Err(format!("media part {} could not be read: {e}", rel.target)),
        };
        Some(request)
    }

    fn write_table(&mut self, table: &XmlElement, out: &mut String) -> Result<()> {
        let grid = TableGrid::from_table(table);
        out.push_str("<table>");
        for (row_index, row) in grid.rows.iter().enumerate() {
            out.push_str("<tr>");
            for cell in &row.cells {
                if cell.merge == VerticalMerge::Continue {
                    continue;
                }
                let tag = if row.header { "th" } else { "td" };
                out.push('<');
                out.push_str(tag);
                if cell.span > 1 {
                    let _ = write!(out, " colspan=\"{}\"", cell.span);
                }
                if cell.merge == VerticalMerge::Restart {
                    let rowspan = grid.rowspan(row_index, cell.column);
                    if rowspan > 1 {
                        let _ = write!(out, " rowspan=\"{rowspan}\"");
                    }
                }
                out.push('>');
                self.write_blocks(cell.element, out)?;
                let _ = write!(out, "</{tag}>");
            }
            out.push_str("</tr>");
        }
        out.push_str("</table>");
        Ok(())
    }
}

/// Open `<ul>`/`<ol>` elements for the current run of numbered paragraphs.
///
/// Depth `n` means `n` lists are open, each with an open `<li>`.
#[derive(Debug, Default)]
struct ListStack {
    open: Vec<ListKind>,
}

impl ListStack {
    fn enter(&mut self, depth: usize, kind: ListKind, out: &mut String) {
        while self.open.len() > depth {
            self.pop(out);
        }
        if self.open.len() == depth {
            if self.open.last() == Some(&kind) {
                out.push_str("</li><li>");
                return;
            }
            self.pop(out);
        }
        while self.open.len() < depth {
            let _ = write!(out, "<{}><li>", kind.tag());
            self.open.push(kind);
        }
    }

    fn pop(&mut self, out: &mut String) {
        if let Some(kind) = self.open.pop() {
            let _ = write!(out, "</li></{}>", kind.tag());
        }
    }

    fn close_all(&mut self, out: &mut String) {
        while !self.open.is_empty() {
            self.pop(out);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RunFormat {
    bold: bool,
    italic: bool,
    strike: bool,
    highlight: bool,
    superscript: bool,
    subscript: bool,
}

impl RunFormat {
    fn from_properties(properties: Option<&XmlElement>) -> Self {
        let Some(pr) = properties else {
            return Self::default();
        };
        let vert_align = pr.child_val("vertAlign");
        Self {
            bold: is_toggle_on(pr.child("b")),
            italic: is_toggle_on(pr.child("i")),
            strike: is_toggle_on(pr.child("strike")) || is_toggle_on(pr.child("dstrike")),
            highlight: is_toggle_on(pr.child("highlight")),
            superscript: vert_align == Some("superscript"),
            subscript: vert_align == Some("subscript"),
        }
    }

    /// Tags to open, outermost first
    fn tags(self) -> Vec<&'static str> {
        let mut tags = Vec::new();
        if self.bold {
            tags.push("strong");
        }
        if self.italic {
            tags.push("em");
        }
        if self.strike {
            tags.push("del");
        }
        if self.highlight {
            tags.push("mark");
        }
        if self.superscript {
            tags.push("sup");
        } else if self.subscript {
            tags.push("sub");
        }
        tags
    }
}

/// Inline HTML with adjacent runs of identical formatting merged
#[derive(Debug, Default)]
struct InlineWriter {
    html: String,
    format: RunFormat,
}

impl InlineWriter {
    fn switch(&mut self, format: RunFormat) {
        if format == self.format {
            return;
        }
        for tag in self.format.tags().iter().rev() {
            let _ = write!(self.html, "</{tag}>");
        }
        for tag in format.tags() {
            let _ = write!(self.html, "<{tag}>");
        }
        self.format = format;
    }

    fn text(&mut self, format: RunFormat, text: &str) {
        if text.is_empty() {
            return;
        }
        self.switch(format);
        self.html.push_str(&encode_text(text));
    }

    fn formatted_markup(&mut self, format: RunFormat, markup: &str) {
        self.switch(format);
        self.html.push_str(markup);
    }

    /// Markup outside any run formatting
    fn markup(&mut self, markup: &str) {
        self.switch(RunFormat::default());
        self.html.push_str(markup);
    }

    fn finish(mut self) -> String {
        self.switch(RunFormat::default());
        self.html
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerticalMerge {
    None,
    Restart,
    Continue,
}

#[derive(Debug)]
struct GridCell<'x> {
    element: &'x XmlElement,
    /// First grid column the cell covers
    column: usize,
    span: usize,
    merge: VerticalMerge,
}

#[derive(Debug)]
struct GridRow<'x> {
    header: bool,
    cells: Vec<GridCell<'x>>,
}

/// Widest `gridSpan`/`gridBefore` honoured; larger values are clamped
const MAX_GRID_SPAN: usize = 1000;

/// Cells of a `w:tbl` placed on the table grid
#[derive(Debug)]
struct TableGrid<'x> {
    rows: Vec<GridRow<'x>>,
}

impl<'x> TableGrid<'x> {
    fn from_table(table: &'x XmlElement) -> Self {
        let rows = table
            .children_named("tr")
            .map(|tr| {
                let row_props = tr.child("trPr");
                let header = is_toggle_on(row_props.and_then(|pr| pr.child("tblHeader")));
                let mut column = row_props
                    .and_then(|pr| pr.child_val("gridBefore"))
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(0)
                    .min(MAX_GRID_SPAN);
                let cells = tr
                    .children_named("tc")
                    .map(|tc| {
                        let props = tc.child("tcPr");
                        let span = props
                            .and_then(|pr| pr.child_val("gridSpan"))
                            .and_then(|v| v.parse::<usize>().ok())
                            .filter(|&span| span > 0)
                            .unwrap_or(1)
                            .min(MAX_GRID_SPAN);
                        let merge = match props.and_then(|pr| pr.child("vMerge")) {
                            None => VerticalMerge::None,
                            Some(v) if v.attr("val") == Some("restart") => VerticalMerge::Restart,
                            Some(_) => VerticalMerge::Continue,
                        };
                        let cell = GridCell {
                            element: tc,
                            column,
                            span,
                            merge,
                        };
                        column = column.saturating_add(span);
                        cell
                    })
                    .collect();
                GridRow { header, cells }
            })
            .collect();
        Self { rows }
    }

    /// Rows covered by the merge starting at `row`/`column`
    fn rowspan(&self, row: usize, column: usize) -> usize {
        1 + self.rows[row + 1..]
            .iter()
            .take_while(|next| {
                next.cells
                    .iter()
                    .any(|c| c.column == column && c.merge == VerticalMerge::Continue)
            })
            .count()
    }
}
