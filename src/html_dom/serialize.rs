//! HTML serialization for arena trees.
//!
//! Two callers with different placeholder rules:
//! - table isolation serializes an original table subtree, where a
//!   placeholder can never legitimately appear;
//! - the emitter serializes the rewritten document, where each placeholder
//!   becomes a slot element and its payload moves to a [`SlotTable`].

use super::{HtmlTree, MAX_HTML_NESTING_DEPTH, NodeId, NodeKind};
use crate::error::{ConversionError, Result};

/// Tag name of the element standing in for an isolated table
pub const SLOT_TAG: &str = "docx-table-slot";

/// Attribute carrying the slot index
pub const SLOT_ATTR: &str = "data-slot";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Original markup of isolated tables, indexed by slot number
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotTable {
    payloads: Vec<String>,
}

impl SlotTable {
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&str> {
        self.payloads.get(slot).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    fn push(&mut self, markup: &str) -> usize {
        self.payloads.push(markup.to_string());
        self.payloads.len() - 1
    }
}

enum PlaceholderMode<'a> {
    Reject,
    Slots(&'a mut SlotTable),
}

impl HtmlTree {
    /// Serialize `id` including its own tags.
    ///
    /// # Errors
    ///
    /// [`ConversionError::Serialization`] if the subtree contains a placeholder
    /// (placeholders are never nested) or the synthetic root.
    pub fn outer_html(&self, id: NodeId) -> Result<String> {
        let mut out = String::new();
        self.write_node(id, &mut out, &mut PlaceholderMode::Reject, 0)?;
        Ok(out)
    }

    /// Serialize the whole document for the Markdown engine.
    ///
    /// Placeholders are written as `<docx-table-slot data-slot="N">` elements
    /// and their markup is collected into the returned [`SlotTable`].
    pub fn to_html_with_slots(&self) -> Result<(String, SlotTable)> {
        let mut slots = SlotTable::default();
        let mut out = String::new();
        {
            let mut mode = PlaceholderMode::Slots(&mut slots);
            for &child in self.node(self.root()).children() {
                self.write_node(child, &mut out, &mut mode, 1)?;
            }
        }
        Ok((out, slots))
    }

    fn write_node(
        &self,
        id: NodeId,
        out: &mut String,
        mode: &mut PlaceholderMode<'_>,
        depth: usize,
    ) -> Result<()> {
        if depth > MAX_HTML_NESTING_DEPTH {
            return Err(ConversionError::Serialization(format!(
                "nesting deeper than {MAX_HTML_NESTING_DEPTH} levels"
            )));
        }

        let node = self.node(id);
        match &node.kind {
            NodeKind::Root => {
                return Err(ConversionError::Serialization(
                    "document root found inside a subtree".to_string(),
                ));
            }
            NodeKind::Text(text) => {
                let raw = node
                    .parent()
                    .and_then(|p| self.node(p).tag_name())
                    .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));
                if raw {
                    out.push_str(text);
                } else {
                    out.push_str(&html_escape::encode_text(text));
                }
            }
            NodeKind::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
            NodeKind::Placeholder { markup } => match mode {
                PlaceholderMode::Reject => {
                    return Err(ConversionError::Serialization(
                        "placeholder nested inside isolated markup".to_string(),
                    ));
                }
                PlaceholderMode::Slots(slots) => {
                    let slot = slots.push(markup);
                    out.push('<');
                    out.push_str(SLOT_TAG);
                    out.push(' ');
                    out.push_str(SLOT_ATTR);
                    out.push_str("=\"");
                    out.push_str(&slot.to_string());
                    out.push_str("\"></");
                    out.push_str(SLOT_TAG);
                    out.push('>');
                }
            },
            NodeKind::Element { name, attrs } => {
                out.push('<');
                out.push_str(name);
                for (key, value) in attrs {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(value));
                    out.push('"');
                }
                out.push('>');

                if VOID_ELEMENTS.contains(&name.as_str()) {
                    return Ok(());
                }

                for &child in node.children() {
                    self.write_node(child, out, mode, depth + 1)?;
                }

                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outer_html_roundtrips_markup() {
        let html = r#"<table><tbody><tr><td colspan="2">a &amp; b</td></tr></tbody></table>"#;
        let tree = HtmlTree::parse_fragment(html).expect("parse");
        let table = tree.node(tree.root()).children()[0];
        assert_eq!(tree.outer_html(table).expect("serialize"), html);
    }

    #[test]
    fn test_void_elements_have_no_closing_tag() {
        let tree = HtmlTree::parse_fragment(r#"<p>a<br>b<img src="x.png"></p>"#).expect("parse");
        let p = tree.node(tree.root()).children()[0];
        let out = tree.outer_html(p).expect("serialize");
        assert_eq!(out, r#"<p>a<br>b<img src="x.png"></p>"#);
    }

    #[test]
    fn test_placeholders_become_slots() {
        let mut tree = HtmlTree::parse_fragment("<p>before</p><table></table><p>after</p>")
            .expect("parse");
        let table = tree.node(tree.root()).children()[1];
        tree.replace_with(
            table,
            NodeKind::Placeholder {
                markup: "<table><tr><td>kept</td></tr></table>".into(),
            },
        );

        let (html, slots) = tree.to_html_with_slots().expect("serialize");
        assert_eq!(
            html,
            r#"<p>before</p><docx-table-slot data-slot="0"></docx-table-slot><p>after</p>"#
        );
        assert_eq!(slots.len(), 1);
        assert_eq!(slots.get(0), Some("<table><tr><td>kept</td></tr></table>"));
    }

    #[test]
    fn test_outer_html_rejects_nested_placeholder() {
        let mut tree = HtmlTree::new();
        let root = tree.root();
        let div = tree.append(
            root,
            NodeKind::Element {
                name: "div".into(),
                attrs: Vec::new(),
            },
        );
        tree.append(div, NodeKind::Placeholder { markup: String::new() });

        let err = tree.outer_html(div).unwrap_err();
        assert!(matches!(err, ConversionError::Serialization(_)));
    }
}
