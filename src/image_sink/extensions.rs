//! Content type → file extension table for extracted images.

use std::collections::HashMap;

/// Extension used when a content type is missing or unrecognized
pub const DEFAULT_EXTENSION: &str = ".png";

/// Fixed mapping; extended per configuration through [`ImageExtensions::with_overrides`]
const BUILTIN_EXTENSIONS: &[(&str, &str)] = &[
    ("image/png", ".png"),
    ("image/jpeg", ".jpg"),
    ("image/jpg", ".jpg"),
    ("image/pjpeg", ".jpg"),
    ("image/gif", ".gif"),
    ("image/bmp", ".bmp"),
    ("image/x-bmp", ".bmp"),
    ("image/webp", ".webp"),
    ("image/svg+xml", ".svg"),
    ("image/tiff", ".tiff"),
    ("image/x-emf", ".emf"),
    ("image/emf", ".emf"),
    ("image/x-wmf", ".wmf"),
    ("image/wmf", ".wmf"),
];

/// Reduce `"Image/PNG; charset=binary"` to `"image/png"`
fn normalize_content_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim().trim_start_matches('.');
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(format!(".{}", ext.to_ascii_lowercase()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageExtensions {
    overrides: HashMap<String, String>,
}

impl ImageExtensions {
    /// Builtin table plus `overrides` (content type → extension).
    ///
    /// Extensions may be given with or without the leading dot; entries that
    /// are not plain alphanumeric extensions are ignored.
    #[must_use]
    pub fn with_overrides<'a>(overrides: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let overrides = overrides
            .into_iter()
            .filter_map(|(content_type, ext)| {
                Some((normalize_content_type(content_type), normalize_extension(ext)?))
            })
            .collect();
        Self { overrides }
    }

    /// Extension (with dot) for `content_type`; [`DEFAULT_EXTENSION`] when
    /// absent or unknown
    #[must_use]
    pub fn extension_for(&self, content_type: Option<&str>) -> String {
        let Some(content_type) = content_type.map(normalize_content_type) else {
            return DEFAULT_EXTENSION.to_string();
        };
        if let Some(ext) = self.overrides.get(&content_type) {
            return ext.clone();
        }
        BUILTIN_EXTENSIONS
            .iter()
            .find(|(known, _)| *known == content_type)
            .map_or(DEFAULT_EXTENSION, |(_, ext)| ext)
            .to_string()
    }
}
