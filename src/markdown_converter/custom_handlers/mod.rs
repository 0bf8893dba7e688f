//! Custom handlers for htmd HTML-to-Markdown conversion
//!
//! The emitter registers exactly two overriding rules, in this priority order:
//! 1. [`PlaceholderRule`] for `<docx-table-slot>` placeholders
//! 2. [`SimpleTableRule`] for every `<table>` still in the document
//!
//! Everything else uses htmd's default mapping plus the inline handlers in
//! [`inline_element_handler`], which cells of simple tables share.

pub mod inline_element_handler;
pub mod table_handler;

use std::sync::Arc;

use htmd::{
    HtmlToMarkdown,
    options::{BulletListMarker, CodeBlockStyle, HeadingStyle, Options},
};

use crate::html_dom::{SLOT_TAG, SlotTable};

pub use table_handler::{
    MIN_COLUMN_WIDTH, PlaceholderRule, SimpleTableRenderer, SimpleTableRule, escape_cell_text,
    format_table,
};

use inline_element_handler::{mark_handler, strikethrough_handler, sub_handler, sup_handler};

/// ATX headings, fenced code blocks and `-` bullets
#[must_use]
pub fn base_options() -> Options {
    Options {
        heading_style: HeadingStyle::Atx,
        code_block_style: CodeBlockStyle::Fenced,
        bullet_list_marker: BulletListMarker::Dash,
        ..Default::default()
    }
}

/// Converter for the inner HTML of simple-table cells.
///
/// Same configuration as the document emitter, without the table rules.
#[must_use]
pub fn create_cell_converter() -> HtmlToMarkdown {
    HtmlToMarkdown::builder()
        .options(base_options())
        .add_handler(vec!["sub"], sub_handler)
        .add_handler(vec!["sup"], sup_handler)
        .add_handler(vec!["mark"], mark_handler)
        .add_handler(vec!["del", "s", "strike"], strikethrough_handler)
        .build()
}

/// Converter for one document whose isolated tables live in `slots`
#[must_use]
pub fn create_converter(slots: Arc<SlotTable>, renderer: Arc<SimpleTableRenderer>) -> HtmlToMarkdown {
    HtmlToMarkdown::builder()
        .options(base_options())
        .add_handler(vec!["sub"], sub_handler)
        .add_handler(vec!["sup"], sup_handler)
        .add_handler(vec!["mark"], mark_handler)
        .add_handler(vec!["del", "s", "strike"], strikethrough_handler)
        .add_handler(vec![SLOT_TAG], PlaceholderRule::new(slots))
        .add_handler(vec!["table"], SimpleTableRule::new(renderer))
        .build()
}
