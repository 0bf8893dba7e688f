//! Builder setter methods

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::builder::ConverterConfigBuilder;

impl ConverterConfigBuilder {
    /// Directory name for extracted images, relative to the output directory
    #[must_use]
    pub fn image_dir_name(mut self, name: impl Into<String>) -> Self {
        self.image_dir_name = name.into();
        self
    }

    #[must_use]
    pub fn insert_title(mut self, insert: bool) -> Self {
        self.insert_title = insert;
        self
    }

    /// Write all output under `dir` instead of next to each source
    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Map one more content type to a file extension
    #[must_use]
    pub fn image_type(mut self, content_type: impl Into<String>, extension: impl Into<String>) -> Self {
        self.extra_image_types
            .insert(content_type.into(), extension.into());
        self
    }

    /// Replace all extra content type mappings
    #[must_use]
    pub fn image_types(mut self, types: BTreeMap<String, String>) -> Self {
        self.extra_image_types = types;
        self
    }
}
