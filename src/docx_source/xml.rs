//! Minimal owned XML tree for WordprocessingML parts.
//!
//! Namespace prefixes are kept on attribute keys but element lookups and
//! attribute lookups go by local name: Word documents in the wild use
//! varying prefixes for the same namespaces.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{ConversionError, Result};

/// Deepest element nesting accepted in a package part
const MAX_XML_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Local name, prefix stripped
    pub name: String,
    /// Qualified attribute keys with unescaped values
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

fn local_part(qualified: &str) -> &str {
    qualified.rsplit(':').next().unwrap_or(qualified)
}

impl XmlElement {
    /// Attribute value by local name (`val` matches `w:val`)
    #[must_use]
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| local_part(key) == local)
            .map(|(_, value)| value.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// First direct child element named `name`
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.name == name)
    }

    /// First element named `name` anywhere below `self`, depth first
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        let mut stack: Vec<&XmlElement> = self.elements().collect();
        stack.reverse();
        while let Some(element) = stack.pop() {
            if element.name == name {
                return Some(element);
            }
            let mut children: Vec<&XmlElement> = element.elements().collect();
            children.reverse();
            stack.extend(children);
        }
        None
    }

    /// `w:val` of the child `name`, if both exist
    #[must_use]
    pub fn child_val(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|c| c.attr("val"))
    }

    /// Concatenated text of all descendants
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(element) => out.push_str(&element.text()),
            }
        }
        out
    }
}

/// Toggle properties like `<w:b/>` are on unless `w:val` says otherwise
#[must_use]
pub fn is_toggle_on(element: Option<&XmlElement>) -> bool {
    match element {
        None => false,
        Some(e) => !matches!(e.attr("val"), Some("0" | "false" | "off" | "none")),
    }
}

fn start_element(e: &BytesStart<'_>) -> Result<XmlElement> {
    let qualified = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ConversionError::Xml(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.push((key, value));
    }
    Ok(XmlElement {
        name: local_part(&qualified).to_string(),
        attrs,
        children: Vec::new(),
    })
}

/// Parse one XML part into its root element.
///
/// # Errors
///
/// [`ConversionError::Xml`] for malformed markup, mismatched tags, a missing
/// root or nesting beyond 256 levels.
pub fn parse_xml(source: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text_start = false;
    reader.config_mut().trim_text_end = false;

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if stack.len() >= MAX_XML_DEPTH {
                    return Err(ConversionError::Xml(format!(
                        "element nesting deeper than {MAX_XML_DEPTH} levels"
                    )));
                }
                stack.push(start_element(&e)?);
            }
            Event::Empty(e) => {
                let element = start_element(&e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Element(element)),
                    None => root = Some(element),
                }
            }
            Event::End(e) => {
                let qualified = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let element = stack.pop().ok_or_else(|| {
                    ConversionError::Xml(format!("unexpected closing tag </{qualified}>"))
                })?;
                if element.name != local_part(&qualified) {
                    return Err(ConversionError::Xml(format!(
                        "expected </{}>, found </{qualified}>",
                        element.name
                    )));
                }
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Element(element)),
                    None => root = Some(element),
                }
            }
            Event::Text(e) => {
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::Text(e.unescape()?.into_owned()));
                }
            }
            Event::CData(e) => {
                if let Some(parent) = stack.last_mut() {
                    parent
                        .children
                        .push(XmlNode::Text(String::from_utf8_lossy(e.as_ref()).into_owned()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ConversionError::Xml(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| ConversionError::Xml("document has no root element".to_string()))
}
