//! Persistence of extracted images under sequential file names.
//!
//! One [`ImageSink`] serves one document. It numbers images in the order the
//! HTML producer hands them over, writes each through an [`ImageStore`], and
//! turns every failure into a warning plus an empty reference so a single
//! bad image never fails the document.

mod extensions;

pub use extensions::{DEFAULT_EXTENSION, ImageExtensions};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

/// Image link directory used when none is configured
pub const DEFAULT_IMAGE_DIR: &str = "images";

/// Image payload handed over by an HTML producer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub alt_text: Option<String>,
}

/// An image the producer found, or why it could not extract it
pub type ImageRequest = std::result::Result<EmbeddedImage, String>;

/// Link target returned to the producer; empty when the image was not saved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageReference {
    pub reference_path: String,
}

impl ImageReference {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reference_path.is_empty()
    }
}

/// One image on its way to storage
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub ordinal: usize,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub destination_path: PathBuf,
}

/// Byte storage behind the sink.
///
/// Implementations write to an existing directory; creating it is the
/// caller's job.
pub trait ImageStore: Send + Sync {
    fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()>;
}

/// [`ImageStore`] on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageStore;

impl ImageStore for FsImageStore {
    fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        std::fs::write(path, bytes)
    }
}

/// File-name stem for a document's images.
///
/// Unsafe characters are removed; whitespace becomes `-`. Falls back to
/// `document` if nothing usable remains.
#[must_use]
pub fn sanitize_base_name(name: &str) -> String {
    let cleaned = sanitize_filename::sanitize(name.trim());
    let dashed: String = cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    let dashed = dashed.trim_matches('.').to_string();
    if dashed.is_empty() {
        "document".to_string()
    } else {
        dashed
    }
}

/// Per-document image numbering and storage
pub struct ImageSink {
    store: Arc<dyn ImageStore>,
    image_dir: PathBuf,
    link_dir: String,
    base_name: String,
    extensions: ImageExtensions,
    issued: usize,
    warnings: Vec<String>,
}

impl std::fmt::Debug for ImageSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSink")
            .field("image_dir", &self.image_dir)
            .field("link_dir", &self.link_dir)
            .field("base_name", &self.base_name)
            .field("issued", &self.issued)
            .finish_non_exhaustive()
    }
}

impl ImageSink {
    /// Sink writing into `image_dir` with files named after `base_name`
    pub fn new(
        store: Arc<dyn ImageStore>,
        image_dir: impl Into<PathBuf>,
        base_name: &str,
    ) -> Self {
        Self {
            store,
            image_dir: image_dir.into(),
            link_dir: DEFAULT_IMAGE_DIR.to_string(),
            base_name: sanitize_base_name(base_name),
            extensions: ImageExtensions::default(),
            issued: 0,
            warnings: Vec::new(),
        }
    }

    /// Directory name used in returned references (default `images`)
    #[must_use]
    pub fn with_link_dir(mut self, link_dir: impl Into<String>) -> Self {
        self.link_dir = link_dir.into();
        self
    }

    #[must_use]
    pub fn with_extensions(mut self, extensions: ImageExtensions) -> Self {
        self.extensions = extensions;
        self
    }

    /// `{base}-image-{ordinal:03}{ext}`
    #[must_use]
    pub fn file_name(&self, ordinal: usize, content_type: Option<&str>) -> String {
        format!(
            "{}-image-{:03}{}",
            self.base_name,
            ordinal,
            self.extensions.extension_for(content_type)
        )
    }

    /// Take one image in document order.
    ///
    /// Every call consumes the next ordinal, including calls for images the
    /// producer failed to extract. Failures are recorded as warnings naming
    /// the ordinal and produce an empty reference.
    pub fn accept(&mut self, request: ImageRequest) -> ImageReference {
        self.issued += 1;
        let ordinal = self.issued;

        let image = match request {
            Ok(image) => image,
            Err(reason) => {
                warn!(ordinal, "image extraction failed: {reason}");
                self.warnings
                    .push(format!("Image {ordinal}: could not be extracted: {reason}"));
                return ImageReference::default();
            }
        };

        let file_name = self.file_name(ordinal, image.content_type.as_deref());
        let record = ImageRecord {
            ordinal,
            destination_path: self.image_dir.join(&file_name),
            content_type: image.content_type,
            bytes: image.bytes,
        };

        match self.store.write(&record.destination_path, &record.bytes) {
            Ok(()) => {
                debug!(
                    ordinal,
                    path = %record.destination_path.display(),
                    bytes = record.bytes.len(),
                    "saved image"
                );
                ImageReference {
                    reference_path: format!("{}/{}", self.link_dir, file_name),
                }
            }
            Err(e) => {
                warn!(ordinal, path = %record.destination_path.display(), "image write failed: {e}");
                self.warnings
                    .push(format!("Image {ordinal}: failed to write {file_name}: {e}"));
                ImageReference::default()
            }
        }
    }

    /// Number of images seen so far, saved or not
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.issued
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Drain the collected warnings
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }
}
