pub mod batch;
pub mod config;
pub mod docx_source;
pub mod error;
pub mod html_dom;
pub mod image_sink;
pub mod markdown_converter;

pub use batch::{BatchSummary, DocumentOutcome, DocumentStatus, convert_batch, convert_batch_with_cancel};
pub use config::ConverterConfig;
pub use docx_source::{DocxHtmlSource, HtmlSource, Severity, SourceMessage, SourceOutput};
pub use error::{ConversionError, Result};
pub use image_sink::{
    EmbeddedImage, FsImageStore, ImageExtensions, ImageReference, ImageRequest, ImageSink,
    ImageStore,
};
pub use markdown_converter::{
    ConversionResult, convert_document, convert_docx_file, convert_docx_file_async,
    convert_docx_file_with_image_base, convert_html_to_markdown, convert_html_to_markdown_sync,
};
