//! Configuration module for document conversion
//!
//! This module provides the `ConverterConfig` struct, its builder, and the
//! loaders that read it from a host settings map or a JSON file.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod methods;
pub mod settings;
pub mod types;

// Re-exports for public API
pub use builder::ConverterConfigBuilder;
pub use settings::SETTINGS_PREFIX;
pub use types::{ConverterConfig, DEFAULT_IMAGE_DIR_NAME};
