//! Numbering definitions (`word/numbering.xml`) and paragraph styles
//! (`word/styles.xml`).

use std::collections::HashMap;

use super::xml::parse_xml;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

/// `numId` + `ilvl` → list kind
#[derive(Debug, Clone, Default)]
pub struct Numbering {
    /// abstractNumId → (ilvl → numFmt)
    abstract_formats: HashMap<String, HashMap<u8, String>>,
    /// numId → abstractNumId
    instances: HashMap<String, String>,
}

impl Numbering {
    pub fn parse(xml: &str) -> Result<Self> {
        let root = parse_xml(xml)?;
        let mut numbering = Self::default();

        for abstract_num in root.children_named("abstractNum") {
            let Some(id) = abstract_num.attr("abstractNumId") else {
                continue;
            };
            let levels = abstract_num
                .children_named("lvl")
                .filter_map(|lvl| {
                    let ilvl = lvl.attr("ilvl")?.parse::<u8>().ok()?;
                    let format = lvl.child_val("numFmt").unwrap_or("decimal");
                    Some((ilvl, format.to_string()))
                })
                .collect();
            numbering.abstract_formats.insert(id.to_string(), levels);
        }

        for num in root.children_named("num") {
            if let (Some(num_id), Some(abstract_id)) =
                (num.attr("numId"), num.child_val("abstractNumId"))
            {
                numbering
                    .instances
                    .insert(num_id.to_string(), abstract_id.to_string());
            }
        }

        Ok(numbering)
    }

    /// Kind of list for a numbered paragraph.
    ///
    /// `bullet` formats are unordered; every other format is ordered. A
    /// paragraph whose definition is missing is treated as a bulleted item.
    #[must_use]
    pub fn list_kind(&self, num_id: &str, ilvl: u8) -> ListKind {
        let format = self
            .instances
            .get(num_id)
            .and_then(|abstract_id| self.abstract_formats.get(abstract_id))
            .and_then(|levels| levels.get(&ilvl));
        match format.map(String::as_str) {
            Some("bullet") | None => ListKind::Unordered,
            Some(_) => ListKind::Ordered,
        }
    }
}

/// Paragraph style id → heading level
#[derive(Debug, Clone, Default)]
pub struct Styles {
    names: HashMap<String, String>,
}

impl Styles {
    pub fn parse(xml: &str) -> Result<Self> {
        let root = parse_xml(xml)?;
        let names = root
            .children_named("style")
            .filter_map(|style| {
                let id = style.attr("styleId")?;
                let name = style.child_val("name")?;
                Some((id.to_string(), name.to_string()))
            })
            .collect();
        Ok(Self { names })
    }

    /// Heading level for a paragraph style.
    ///
    /// Matches style ids (`Heading2`) and display names (`heading 2`), so
    /// localized documents whose ids differ still resolve through styles.xml.
    /// `Title` is level 1 and `Subtitle` level 2; levels past 6 clamp to 6.
    #[must_use]
    pub fn heading_level(&self, style_id: &str) -> Option<u8> {
        heading_level_from_name(style_id).or_else(|| {
            self.names
                .get(style_id)
                .and_then(|name| heading_level_from_name(name))
        })
    }
}

fn heading_level_from_name(name: &str) -> Option<u8> {
    let normalized: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    match normalized.as_str() {
        "title" => return Some(1),
        "subtitle" => return Some(2),
        _ => {}
    }
    let level = normalized.strip_prefix("heading")?.parse::<u8>().ok()?;
    (level >= 1).then_some(level.min(6))
}
