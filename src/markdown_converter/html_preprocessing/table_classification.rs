//! Structural classification of top-level HTML tables.
//!
//! A table is COMPLEX when a pipe table cannot represent it: it holds an
//! image, a list or another table, or one of its cells spans more than one
//! row or column. Everything else is SIMPLE.

use crate::html_dom::{HtmlTree, NodeId};

/// Rendering strategy for a top-level table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableClassification {
    /// Rendered as a Markdown pipe table
    Simple,
    /// Kept as raw HTML
    Complex,
}

/// First structural feature that made a table complex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexityReason {
    Image,
    List,
    NestedTable,
    MergedCell,
}

impl std::fmt::Display for ComplexityReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            ComplexityReason::Image => "contains an image",
            ComplexityReason::List => "contains a list",
            ComplexityReason::NestedTable => "contains a nested table",
            ComplexityReason::MergedCell => "has a cell spanning several rows or columns",
        };
        f.write_str(reason)
    }
}

/// Parse a `colspan`/`rowspan` value.
///
/// Leading whitespace is skipped and the leading run of ASCII digits is read;
/// anything after it is ignored (`"2abc"` is 2). Missing, empty or
/// non-numeric values count as 1. Overlong digit runs saturate.
#[must_use]
pub fn parse_span(value: Option<&str>) -> u32 {
    let Some(value) = value else {
        return 1;
    };
    let digits: Vec<u32> = value
        .trim_start()
        .chars()
        .map_while(|c| c.to_digit(10))
        .collect();
    if digits.is_empty() {
        return 1;
    }
    digits
        .into_iter()
        .fold(0u32, |acc, d| acc.saturating_mul(10).saturating_add(d))
}

/// Why `table` is complex, or `None` for a simple table.
///
/// Inspects the whole subtree under `table`, at any depth.
#[must_use]
pub fn complexity_reason(tree: &HtmlTree, table: NodeId) -> Option<ComplexityReason> {
    tree.descendants(table).into_iter().find_map(|id| {
        let node = tree.node(id);
        match node.tag_name()? {
            "img" => Some(ComplexityReason::Image),
            "ul" | "ol" => Some(ComplexityReason::List),
            "table" => Some(ComplexityReason::NestedTable),
            "td" | "th"
                if parse_span(node.attr("colspan")) > 1 || parse_span(node.attr("rowspan")) > 1 =>
            {
                Some(ComplexityReason::MergedCell)
            }
            _ => None,
        }
    })
}

/// Classify one table from its current subtree
#[must_use]
pub fn classify_table(tree: &HtmlTree, table: NodeId) -> TableClassification {
    match complexity_reason(tree, table) {
        Some(_) => TableClassification::Complex,
        None => TableClassification::Simple,
    }
}

/// Whether `id` is a `<table>` with no `<table>` ancestor
#[must_use]
pub fn is_top_level_table(tree: &HtmlTree, id: NodeId) -> bool {
    tree.node(id).is_element("table")
        && !tree
            .ancestors(id)
            .any(|ancestor| tree.node(ancestor).is_element("table"))
}

/// Classify every top-level table in document order.
///
/// Nested tables are never returned; they belong to their container.
#[must_use]
pub fn classify_top_level_tables(tree: &HtmlTree) -> Vec<(NodeId, TableClassification)> {
    tree.descendants(tree.root())
        .into_iter()
        .filter(|&id| is_top_level_table(tree, id))
        .map(|id| (id, classify_table(tree, id)))
        .collect()
}
