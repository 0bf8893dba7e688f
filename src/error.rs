//! Error types for document conversion
//!
//! Per-image problems never surface here: the image sink turns them into
//! warnings. Everything in [`ConversionError`] aborts the current document.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, ConversionError>;

/// Fatal, per-document conversion failures
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Reading or writing a file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a readable Word package (bad zip, missing part)
    #[error("Invalid Word package: {0}")]
    InvalidPackage(String),

    /// A package part contained malformed XML
    #[error("Malformed XML in Word package: {0}")]
    Xml(String),

    /// Source HTML exceeds the accepted input size
    #[error("HTML input too large: {size} bytes (limit {limit} bytes)")]
    HtmlTooLarge { size: usize, limit: usize },

    /// Source HTML could not be turned into a document tree
    #[error("Malformed source HTML: {0}")]
    MalformedHtml(String),

    /// A table could not be serialized during isolation
    #[error("Failed to serialize table markup: {0}")]
    Serialization(String),

    /// The Markdown engine rejected the rewritten HTML
    #[error("Markdown emission failed: {0}")]
    Emitter(String),

    /// Invalid converter configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ConversionError {
    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConversionError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the failure originates in the input document rather than the environment
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ConversionError::InvalidPackage(_)
                | ConversionError::Xml(_)
                | ConversionError::HtmlTooLarge { .. }
                | ConversionError::MalformedHtml(_)
        )
    }
}

impl From<zip::result::ZipError> for ConversionError {
    fn from(error: zip::result::ZipError) -> Self {
        ConversionError::InvalidPackage(error.to_string())
    }
}

impl From<quick_xml::Error> for ConversionError {
    fn from(error: quick_xml::Error) -> Self {
        ConversionError::Xml(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mentions_path() {
        let err = ConversionError::io(
            "/tmp/report.docx",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        let message = err.to_string();
        assert!(message.contains("/tmp/report.docx"), "got: {message}");
        assert!(message.contains("missing"));
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_input_error_classification() {
        assert!(ConversionError::InvalidPackage("no document.xml".into()).is_input_error());
        assert!(ConversionError::HtmlTooLarge { size: 2, limit: 1 }.is_input_error());
        assert!(!ConversionError::Serialization("depth".into()).is_input_error());
    }
}
