//! HTML producers for the conversion pipeline.
//!
//! [`HtmlSource`] is the seam between document formats and the Markdown
//! pipeline: a source yields one HTML string and hands every image it meets
//! to a callback, in document order. [`DocxHtmlSource`] reads Word packages.

mod document;
pub mod numbering;
pub mod package;
pub mod xml;

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ConversionError, Result};
use crate::image_sink::{ImageReference, ImageRequest};
use document::{DocumentWriter, PartContext};
use numbering::{Numbering, Styles};
use package::Package;
use xml::parse_xml;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// Diagnostic from a source about content it could not carry over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMessage {
    pub severity: Severity,
    pub text: String,
}

impl fmt::Display for SourceMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOutput {
    pub html: String,
    pub messages: Vec<SourceMessage>,
}

/// A document that can be rendered to HTML.
///
/// `images` is called synchronously, exactly once per image and in document
/// order; the returned reference becomes the `src` of the emitted `<img>`.
pub trait HtmlSource {
    fn produce(
        &self,
        images: &mut dyn FnMut(ImageRequest) -> ImageReference,
    ) -> Result<SourceOutput>;
}

#[derive(Debug, Clone)]
enum DocxInput {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// [`HtmlSource`] over a `.docx` file or its bytes
#[derive(Debug, Clone)]
pub struct DocxHtmlSource {
    input: DocxInput,
}

impl DocxHtmlSource {
    /// Read the package from `path` when producing
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            input: DocxInput::Path(path.into()),
        }
    }

    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            input: DocxInput::Bytes(bytes),
        }
    }

    /// Source file, if reading from disk
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.input {
            DocxInput::Path(path) => Some(path),
            DocxInput::Bytes(_) => None,
        }
    }

    fn load(&self) -> Result<Cow<'_, [u8]>> {
        match &self.input {
            DocxInput::Path(path) => std::fs::read(path)
                .map(Cow::Owned)
                .map_err(|e| ConversionError::io(path, e)),
            DocxInput::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
        }
    }
}

/// Parse an optional auxiliary part, downgrading failures to a warning
fn auxiliary_part<T: Default>(
    xml: Option<String>,
    part: &str,
    parse: impl FnOnce(&str) -> Result<T>,
    messages: &mut Vec<SourceMessage>,
) -> T {
    let Some(xml) = xml else {
        return T::default();
    };
    parse(&xml).unwrap_or_else(|e| {
        warn!(part, "ignoring unreadable part: {e}");
        messages.push(SourceMessage {
            severity: Severity::Warning,
            text: format!("{part} could not be read ({e}); list and heading styles may be lost"),
        });
        T::default()
    })
}

impl HtmlSource for DocxHtmlSource {
    fn produce(
        &self,
        images: &mut dyn FnMut(ImageRequest) -> ImageReference,
    ) -> Result<SourceOutput> {
        let bytes = self.load()?;
        let mut package = Package::open(&bytes)?;

        let main_part = package.main_document_part()?;
        let xml = package.read_string(&main_part)?.ok_or_else(|| {
            ConversionError::InvalidPackage(format!("main document part {main_part} is missing"))
        })?;
        let document = parse_xml(&xml)?;
        let body = document.child("body").ok_or_else(|| {
            ConversionError::InvalidPackage(format!("{main_part} has no w:body element"))
        })?;

        let rels = package.relationships_for(&main_part)?;
        let content_types = package.content_types()?;

        let mut messages = Vec::new();
        let numbering_part = rels
            .by_kind("numbering")
            .map_or_else(|| "word/numbering.xml".to_string(), |rel| rel.target.clone());
        let styles_part = rels
            .by_kind("styles")
            .map_or_else(|| "word/styles.xml".to_string(), |rel| rel.target.clone());
        let numbering = auxiliary_part(
            package.read_string(&numbering_part)?,
            &numbering_part,
            Numbering::parse,
            &mut messages,
        );
        let styles = auxiliary_part(
            package.read_string(&styles_part)?,
            &styles_part,
            Styles::parse,
            &mut messages,
        );

        debug!(part = %main_part, "rendering Word document body");
        let parts = PartContext {
            rels,
            content_types,
            numbering,
            styles,
        };
        let mut writer = DocumentWriter::new(package, parts, images);
        for message in messages {
            writer.note(message.severity, message.text);
        }
        let (html, messages) = writer.write_body(body)?;
        Ok(SourceOutput { html, messages })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_display_has_severity_tag() {
        let message = SourceMessage {
            severity: Severity::Warning,
            text: "Equations are not supported".into(),
        };
        assert_eq!(message.to_string(), "[warning] Equations are not supported");
    }

    #[test]
    fn test_not_a_zip_is_invalid_package() {
        let source = DocxHtmlSource::from_bytes(b"plain text".to_vec());
        let err = source
            .produce(&mut |_| ImageReference::default())
            .unwrap_err();
        assert!(matches!(err, ConversionError::InvalidPackage(_)), "{err:?}");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let source = DocxHtmlSource::from_path("/nonexistent/report.docx");
        let err = source
            .produce(&mut |_| ImageReference::default())
            .unwrap_err();
        assert!(matches!(err, ConversionError::Io { .. }), "{err:?}");
    }
}
