//! Getter methods for `ConverterConfig`
//!
//! Plain accessors plus the paths derived from them for a given source file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::types::ConverterConfig;
use crate::image_sink::ImageExtensions;

impl ConverterConfig {
    #[must_use]
    pub fn image_dir_name(&self) -> &str {
        &self.image_dir_name
    }

    #[must_use]
    pub fn insert_title(&self) -> bool {
        self.insert_title
    }

    #[must_use]
    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    #[must_use]
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    #[must_use]
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    #[must_use]
    pub fn extra_image_types(&self) -> &BTreeMap<String, String> {
        &self.extra_image_types
    }

    /// Builtin extension table with this config's overrides applied
    #[must_use]
    pub fn image_extensions(&self) -> ImageExtensions {
        ImageExtensions::with_overrides(
            self.extra_image_types
                .iter()
                .map(|(content_type, ext)| (content_type.as_str(), ext.as_str())),
        )
    }

    /// Output directory for `source`
    #[must_use]
    pub fn output_dir_for(&self, source: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => source
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }

    /// `<output dir>/<stem>.md`
    #[must_use]
    pub fn markdown_path_for(&self, source: &Path) -> PathBuf {
        let mut file_name = source
            .file_stem()
            .unwrap_or(source.as_os_str())
            .to_os_string();
        file_name.push(".md");
        self.output_dir_for(source).join(file_name)
    }

    /// `<output dir>/<image dir name>`
    #[must_use]
    pub fn image_dir_for(&self, source: &Path) -> PathBuf {
        self.output_dir_for(source).join(&self.image_dir_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_next_to_source() {
        let config = ConverterConfig::default();
        let source = Path::new("/docs/q3 report.docx");
        assert_eq!(config.markdown_path_for(source), PathBuf::from("/docs/q3 report.md"));
        assert_eq!(config.image_dir_for(source), PathBuf::from("/docs/images"));
    }

    #[test]
    fn test_paths_under_output_dir() {
        let config = ConverterConfig::builder()
            .output_dir("/out")
            .image_dir_name("media")
            .build()
            .expect("valid");
        let source = Path::new("/docs/a.b.docx");
        assert_eq!(config.markdown_path_for(source), PathBuf::from("/out/a.b.md"));
        assert_eq!(config.image_dir_for(source), PathBuf::from("/out/media"));
    }
}
