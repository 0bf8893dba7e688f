//! Core configuration types for document conversion

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Image directory created next to the Markdown output by default
pub const DEFAULT_IMAGE_DIR_NAME: &str = "images";

/// Settings shared by every document of a conversion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConverterConfig {
    /// Name of the image directory, relative to the output directory.
    ///
    /// **INVARIANT:** a single non-empty path component (checked in the builder
    /// and the loaders), so images never land outside the output directory.
    pub(crate) image_dir_name: String,

    /// Prepend `# <file stem>` to each document
    pub(crate) insert_title: bool,

    /// Where `.md` files and the image directory go.
    /// `None` writes next to each source document.
    pub(crate) output_dir: Option<PathBuf>,

    /// Replace existing `.md` files instead of failing the document
    pub(crate) overwrite: bool,

    /// Convert batch documents on the rayon pool
    pub(crate) parallel: bool,

    /// Content type → extension entries merged over the builtin table
    pub(crate) extra_image_types: BTreeMap<String, String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            image_dir_name: DEFAULT_IMAGE_DIR_NAME.to_string(),
            insert_title: true,
            output_dir: None,
            overwrite: false,
            parallel: false,
            extra_image_types: BTreeMap::new(),
        }
    }
}
