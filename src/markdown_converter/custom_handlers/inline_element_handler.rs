//! Inline elements without a native Markdown form.
//!
//! `<sub>`, `<sup>` and `<mark>` pass through as literal HTML around their
//! converted content, so `H<sub>2</sub>O` survives unchanged. Strikethrough
//! elements map to GFM `~~`.

use htmd::{
    Element,
    element_handler::{HandlerResult, Handlers},
};

fn wrap_literal(handlers: &dyn Handlers, element: &Element, tag: &str) -> Option<HandlerResult> {
    let content = handlers.walk_children(element.node).content;
    Some(HandlerResult::from(format!("<{tag}>{content}</{tag}>")))
}

pub fn sub_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    wrap_literal(handlers, &element, "sub")
}

pub fn sup_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    wrap_literal(handlers, &element, "sup")
}

pub fn mark_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    wrap_literal(handlers, &element, "mark")
}

/// `<del>`, `<s>`, `<strike>` → `~~text~~`; empty content emits nothing
pub fn strikethrough_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let content = handlers.walk_children(element.node).content;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Some(HandlerResult::from(String::new()));
    }
    Some(HandlerResult::from(format!("~~{trimmed}~~")))
}
