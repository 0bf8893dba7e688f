//! Loading `ConverterConfig` from host settings and JSON files

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::types::ConverterConfig;
use crate::error::{ConversionError, Result};

/// Namespace of the converter's keys in a host settings map
pub const SETTINGS_PREFIX: &str = "docx.";

fn expect_bool(key: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| ConversionError::Config(format!("{key} must be a boolean, got {value}")))
}

fn expect_str<'v>(key: &str, value: &'v Value) -> Result<&'v str> {
    value
        .as_str()
        .ok_or_else(|| ConversionError::Config(format!("{key} must be a string, got {value}")))
}

impl ConverterConfig {
    /// Read the converter's keys from a flat host settings map.
    ///
    /// Recognized keys: `docx.imageFolder`, `docx.insertTitle`,
    /// `docx.outputDirectory`, `docx.overwrite`, `docx.parallel` and
    /// `docx.imageTypes` (object of content type → extension). Other keys are
    /// ignored; an empty `docx.outputDirectory` means "next to the source".
    ///
    /// # Errors
    ///
    /// [`ConversionError::Config`] for a recognized key with the wrong type or
    /// a resulting config that fails validation.
    pub fn from_settings(settings: &HashMap<String, Value>) -> Result<Self> {
        let mut config = Self::default();

        for (key, value) in settings {
            let Some(name) = key.strip_prefix(SETTINGS_PREFIX) else {
                continue;
            };
            match name {
                "imageFolder" => config.image_dir_name = expect_str(key, value)?.trim().to_string(),
                "insertTitle" => config.insert_title = expect_bool(key, value)?,
                "outputDirectory" => {
                    let dir = expect_str(key, value)?.trim();
                    config.output_dir = (!dir.is_empty()).then(|| PathBuf::from(dir));
                }
                "overwrite" => config.overwrite = expect_bool(key, value)?,
                "parallel" => config.parallel = expect_bool(key, value)?,
                "imageTypes" => {
                    let entries = value.as_object().ok_or_else(|| {
                        ConversionError::Config(format!("{key} must be an object, got {value}"))
                    })?;
                    config.extra_image_types = entries
                        .iter()
                        .map(|(content_type, ext)| {
                            let ext = expect_str(&format!("{key}.{content_type}"), ext)?;
                            Ok((content_type.clone(), ext.to_string()))
                        })
                        .collect::<Result<BTreeMap<_, _>>>()?;
                }
                other => debug!(key = other, "ignoring unknown converter setting"),
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file with camelCase keys; missing keys
    /// take their defaults.
    ///
    /// # Errors
    ///
    /// [`ConversionError::Io`] if the file cannot be read,
    /// [`ConversionError::Config`] if it is not a valid config.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ConversionError::io(path, e))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| ConversionError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_from_settings_reads_known_keys() {
        let config = ConverterConfig::from_settings(&settings(&[
            ("docx.imageFolder", json!("assets")),
            ("docx.insertTitle", json!(false)),
            ("docx.outputDirectory", json!("/tmp/md")),
            ("docx.overwrite", json!(true)),
            ("docx.imageTypes", json!({"image/heic": "heic"})),
            ("editor.fontSize", json!(14)),
            ("docx.somethingNew", json!([1, 2])),
        ]))
        .expect("valid settings");

        assert_eq!(config.image_dir_name(), "assets");
        assert!(!config.insert_title());
        assert_eq!(config.output_dir(), Some(Path::new("/tmp/md")));
        assert!(config.overwrite());
        assert!(!config.parallel());
        assert_eq!(config.extra_image_types().get("image/heic").map(String::as_str), Some("heic"));
    }

    #[test]
    fn test_empty_output_directory_means_next_to_source() {
        let config =
            ConverterConfig::from_settings(&settings(&[("docx.outputDirectory", json!(""))]))
                .expect("valid");
        assert_eq!(config.output_dir(), None);
    }

    #[test]
    fn test_wrong_type_is_config_error() {
        let err = ConverterConfig::from_settings(&settings(&[("docx.insertTitle", json!("yes"))]))
            .unwrap_err();
        assert!(matches!(err, ConversionError::Config(_)));
        assert!(err.to_string().contains("docx.insertTitle"), "{err}");
    }

    #[test]
    fn test_invalid_image_folder_rejected() {
        let err = ConverterConfig::from_settings(&settings(&[("docx.imageFolder", json!("../up"))]))
            .unwrap_err();
        assert!(matches!(err, ConversionError::Config(_)));
    }

    #[test]
    fn test_from_json_file_applies_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "imageDirName": "pics", "parallel": true }"#).expect("write");

        let config = ConverterConfig::from_json_file(&path).expect("load");
        assert_eq!(config.image_dir_name(), "pics");
        assert!(config.parallel());
        assert!(config.insert_title());
    }

    #[test]
    fn test_from_json_file_rejects_malformed_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").expect("write");
        assert!(matches!(
            ConverterConfig::from_json_file(&path),
            Err(ConversionError::Config(_))
        ));
    }
}
