//! Fluent builder for `ConverterConfig`
//!
//! Every field has a default, so the builder has no required steps; `build()`
//! validates the combination once.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use super::types::{ConverterConfig, DEFAULT_IMAGE_DIR_NAME};
use crate::error::{ConversionError, Result};

#[derive(Debug, Clone)]
pub struct ConverterConfigBuilder {
    pub(crate) image_dir_name: String,
    pub(crate) insert_title: bool,
    pub(crate) output_dir: Option<PathBuf>,
    pub(crate) overwrite: bool,
    pub(crate) parallel: bool,
    pub(crate) extra_image_types: BTreeMap<String, String>,
}

impl Default for ConverterConfigBuilder {
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

impl ConverterConfig {
    /// Create a builder for configuring a `ConverterConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder::default()
    }

    /// Check the invariants a deserialized config cannot enforce itself
    ///
    /// # Errors
    ///
    /// [`ConversionError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        validate_image_dir_name(&self.image_dir_name)?;
        for (content_type, extension) in &self.extra_image_types {
            let ext = extension.trim_start_matches('.');
            if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ConversionError::Config(format!(
                    "image type '{content_type}' maps to invalid extension '{extension}'"
                )));
            }
        }
        Ok(())
    }
}

/// `image_dir_name` must name one directory below the output directory
fn validate_image_dir_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ConversionError::Config(format!(
            "image directory '{name}' must be a single relative path component"
        ))),
    }
}

impl ConverterConfigBuilder {
    /// # Errors
    ///
    /// [`ConversionError::Config`] if the image directory is not a single
    /// relative component or an image type maps to a malformed extension.
    pub fn build(self) -> Result<ConverterConfig> {
        let config = ConverterConfig {
            image_dir_name: self.image_dir_name,
            insert_title: self.insert_title,
            output_dir: self.output_dir,
            overwrite: self.overwrite,
            parallel: self.parallel,
            extra_image_types: self.extra_image_types,
        };
        config.validate()?;
        Ok(config)
    }
}
