//! Building an [`HtmlTree`] from source HTML via scraper.

use scraper::{Html, Node};
use tracing::debug;

use super::{HtmlTree, NodeId, NodeKind, SLOT_TAG};
use crate::error::{ConversionError, Result};

/// Maximum HTML input size accepted for conversion (10 MB)
pub const MAX_HTML_SIZE: usize = 10 * 1024 * 1024;

/// Maximum element nesting depth accepted in source HTML
///
/// Word documents rarely nest deeper than tables inside lists inside tables;
/// anything past this is treated as a broken provider rather than content.
pub const MAX_HTML_NESTING_DEPTH: usize = 100;

impl HtmlTree {
    /// Parse an HTML fragment into an arena tree.
    ///
    /// `<html>`/`<body>` wrappers produced by the fragment parser are dropped;
    /// their children become children of the synthetic root.
    ///
    /// # Errors
    ///
    /// * [`ConversionError::HtmlTooLarge`] if `html` exceeds [`MAX_HTML_SIZE`]
    /// * [`ConversionError::MalformedHtml`] if nesting exceeds [`MAX_HTML_NESTING_DEPTH`]
    pub fn parse_fragment(html: &str) -> Result<Self> {
        if html.len() > MAX_HTML_SIZE {
            return Err(ConversionError::HtmlTooLarge {
                size: html.len(),
                limit: MAX_HTML_SIZE,
            });
        }

        let document = Html::parse_fragment(html);
        if !document.errors.is_empty() {
            debug!(
                count = document.errors.len(),
                "HTML parser recovered from {} error(s)",
                document.errors.len()
            );
        }

        let mut tree = HtmlTree::new();
        let root = tree.root();
        let container = document.root_element();

        // (source node, arena parent, depth)
        let mut stack: Vec<(ego_tree::NodeRef<'_, Node>, NodeId, usize)> = container
            .children()
            .rev()
            .map(|child| (child, root, 1))
            .collect();

        while let Some((node, parent, depth)) = stack.pop() {
            if depth > MAX_HTML_NESTING_DEPTH {
                return Err(ConversionError::MalformedHtml(format!(
                    "element nesting deeper than {MAX_HTML_NESTING_DEPTH} levels"
                )));
            }

            let kind = match node.value() {
                // Slot elements only ever come from table isolation; unwrap
                // any present in the source so they cannot address a slot
                Node::Element(element) if element.name().eq_ignore_ascii_case(SLOT_TAG) => {
                    debug!("unwrapping {SLOT_TAG} element found in source HTML");
                    stack.extend(node.children().rev().map(|child| (child, parent, depth + 1)));
                    continue;
                }
                Node::Element(element) => NodeKind::Element {
                    name: element.name().to_ascii_lowercase(),
                    attrs: element
                        .attrs()
                        .map(|(name, value)| (name.to_string(), value.to_string()))
                        .collect(),
                },
                Node::Text(text) => NodeKind::Text(String::from(&**text)),
                Node::Comment(comment) => NodeKind::Comment(String::from(&**comment)),
                _ => continue,
            };

            let id = tree.append(parent, kind);
            stack.extend(node.children().rev().map(|child| (child, id, depth + 1)));
        }

        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_structure() {
        let tree = HtmlTree::parse_fragment("<p>Hello <b>world</b></p><table><tr><td>x</td></tr></table>")
            .expect("parse");
        let top: Vec<&str> = tree
            .node(tree.root())
            .children()
            .iter()
            .filter_map(|&id| tree.node(id).tag_name())
            .collect();
        assert_eq!(top, vec!["p", "table"]);
        assert_eq!(tree.text_content(tree.root()), "Hello worldx");
    }

    #[test]
    fn test_parse_attributes() {
        let tree = HtmlTree::parse_fragment(r#"<table><tr><td ROWSPAN="2">x</td></tr></table>"#)
            .expect("parse");
        let td = tree
            .descendants(tree.root())
            .into_iter()
            .find(|&id| tree.node(id).is_element("td"))
            .expect("td present");
        assert_eq!(tree.node(td).attr("rowspan"), Some("2"));
    }

    #[test]
    fn test_rejects_oversized_input() {
        let html = "a".repeat(MAX_HTML_SIZE + 1);
        let err = HtmlTree::parse_fragment(&html).unwrap_err();
        assert!(matches!(err, ConversionError::HtmlTooLarge { .. }));
    }

    #[test]
    fn test_rejects_pathological_nesting() {
        let html = "<div>".repeat(MAX_HTML_NESTING_DEPTH + 5);
        let err = HtmlTree::parse_fragment(&html).unwrap_err();
        assert!(matches!(err, ConversionError::MalformedHtml(_)));
    }

    #[test]
    fn test_source_slot_elements_are_unwrapped() {
        let tree = HtmlTree::parse_fragment(
            r#"<p>a</p><docx-table-slot data-slot="0"><b>kept</b></docx-table-slot>"#,
        )
        .expect("parse");
        assert!(
            tree.descendants(tree.root())
                .into_iter()
                .all(|id| !tree.node(id).is_element(SLOT_TAG))
        );
        assert_eq!(tree.text_content(tree.root()), "akept");
    }

    #[test]
    fn test_empty_input() {
        let tree = HtmlTree::parse_fragment("").expect("parse");
        assert!(tree.is_empty());
    }
}
