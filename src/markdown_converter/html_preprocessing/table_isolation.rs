//! Replacement of complex tables with opaque placeholders.

use tracing::debug;

use super::table_classification::{TableClassification, classify_top_level_tables, complexity_reason};
use crate::error::Result;
use crate::html_dom::{HtmlTree, NodeKind};

/// Counts of top-level tables seen during isolation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IsolationReport {
    pub simple: usize,
    pub complex: usize,
}

/// Replace each COMPLEX top-level table with a placeholder holding its markup.
///
/// Every table is classified and every complex table serialized before the
/// first replacement, so no decision depends on an earlier rewrite. Simple
/// tables stay in the tree for the emitter's table rule.
///
/// # Errors
///
/// Returns [`crate::ConversionError::Serialization`] if a complex table cannot be
/// serialized.
pub fn isolate_complex_tables(tree: &mut HtmlTree) -> Result<IsolationReport> {
    let classified = classify_top_level_tables(tree);

    let mut report = IsolationReport::default();
    let mut isolated = Vec::new();
    for (table, classification) in classified {
        match classification {
            TableClassification::Simple => report.simple += 1,
            TableClassification::Complex => {
                report.complex += 1;
                if let Some(reason) = complexity_reason(tree, table) {
                    debug!(node = table.index(), %reason, "isolating complex table");
                }
                isolated.push((table, tree.outer_html(table)?));
            }
        }
    }

    for (table, markup) in isolated {
        tree.replace_with(table, NodeKind::Placeholder { markup });
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html_dom::NodeId;

    fn top_level_kinds(tree: &HtmlTree) -> Vec<String> {
        tree.node(tree.root())
            .children()
            .iter()
            .map(|&id: &NodeId| match &tree.node(id).kind {
                NodeKind::Element { name, .. } => name.clone(),
                NodeKind::Placeholder { .. } => "placeholder".to_string(),
                NodeKind::Text(_) => "#text".to_string(),
                _ => "other".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_complex_replaced_simple_kept() {
        let mut tree = HtmlTree::parse_fragment(
            "<p>a</p>\
             <table><tr><td><ul><li>x</li></ul></td></tr></table>\
             <table><tr><td>plain</td></tr></table>\
             <p>b</p>",
        )
        .expect("parse");

        let report = isolate_complex_tables(&mut tree).expect("isolate");
        assert_eq!(report, IsolationReport { simple: 1, complex: 1 });
        assert_eq!(top_level_kinds(&tree), vec!["p", "placeholder", "table", "p"]);
    }

    #[test]
    fn test_payload_is_original_markup() {
        let mut tree =
            HtmlTree::parse_fragment(r#"<table><tr><td><img src="x.png"></td></tr></table>"#)
                .expect("parse");
        isolate_complex_tables(&mut tree).expect("isolate");

        let placeholder = tree.node(tree.root()).children()[0];
        match &tree.node(placeholder).kind {
            NodeKind::Placeholder { markup } => assert_eq!(
                markup,
                r#"<table><tbody><tr><td><img src="x.png"></td></tr></tbody></table>"#
            ),
            other => panic!("expected placeholder, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_complex_container_keeps_inner_table() {
        let mut tree = HtmlTree::parse_fragment(
            "<table><tr><td><table><tr><td>inner</td></tr></table></td></tr></table>",
        )
        .expect("parse");
        let report = isolate_complex_tables(&mut tree).expect("isolate");
        assert_eq!(report, IsolationReport { simple: 0, complex: 1 });

        let (_, slots) = tree.to_html_with_slots().expect("serialize");
        let payload = slots.get(0).expect("slot 0");
        assert_eq!(payload.matches("<table>").count(), 2);
        assert!(payload.contains("inner"));
    }
}
