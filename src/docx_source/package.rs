//! OPC package access: zip parts, relationships and content types.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use zip::ZipArchive;
use zip::result::ZipError;

use super::xml::parse_xml;
use crate::error::{ConversionError, Result};

const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// An opened `.docx` archive
pub struct Package<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> Package<'a> {
    /// # Errors
    ///
    /// [`ConversionError::InvalidPackage`] if `bytes` is not a zip archive.
    pub fn open(bytes: &'a [u8]) -> Result<Self> {
        Ok(Self {
            archive: ZipArchive::new(Cursor::new(bytes))?,
        })
    }

    /// Raw bytes of a part, `None` if the part does not exist
    pub fn read_bytes(&mut self, part: &str) -> Result<Option<Vec<u8>>> {
        let mut file = match self.archive.by_name(part) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| ConversionError::InvalidPackage(format!("{part}: {e}")))?;
        Ok(Some(bytes))
    }

    /// A part decoded as UTF-8 text
    pub fn read_string(&mut self, part: &str) -> Result<Option<String>> {
        match self.read_bytes(part)? {
            None => Ok(None),
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| ConversionError::InvalidPackage(format!("{part}: {e}"))),
        }
    }

    /// Path of the main document part, from the package relationships
    pub fn main_document_part(&mut self) -> Result<String> {
        let Some(xml) = self.read_string("_rels/.rels")? else {
            return Ok(DEFAULT_MAIN_PART.to_string());
        };
        let rels = Relationships::parse(&xml, "")?;
        Ok(rels
            .by_kind("officeDocument")
            .map(|rel| rel.target.clone())
            .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string()))
    }

    /// Relationships of `part`, empty when it has none
    pub fn relationships_for(&mut self, part: &str) -> Result<Relationships> {
        let (dir, file) = split_part(part);
        let rels_part = if dir.is_empty() {
            format!("_rels/{file}.rels")
        } else {
            format!("{dir}/_rels/{file}.rels")
        };
        match self.read_string(&rels_part)? {
            Some(xml) => Relationships::parse(&xml, dir),
            None => Ok(Relationships::default()),
        }
    }

    pub fn content_types(&mut self) -> Result<ContentTypes> {
        match self.read_string("[Content_Types].xml")? {
            Some(xml) => ContentTypes::parse(&xml),
            None => Ok(ContentTypes::default()),
        }
    }
}

fn split_part(part: &str) -> (&str, &str) {
    match part.rfind('/') {
        Some(pos) => (&part[..pos], &part[pos + 1..]),
        None => ("", part),
    }
}

/// Resolve a relationship target against the directory of its source part
#[must_use]
pub fn resolve_target(base_dir: &str, target: &str) -> String {
    let mut segments: Vec<&str> = if target.starts_with('/') || base_dir.is_empty() {
        Vec::new()
    } else {
        base_dir.split('/').collect()
    };
    for segment in target.trim_start_matches('/').split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub rel_type: String,
    /// Package part path for internal targets, the raw URI for external ones
    pub target: String,
    pub external: bool,
}

/// Relationship id → target map of one part
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    by_id: HashMap<String, Relationship>,
}

impl Relationships {
    pub fn parse(xml: &str, base_dir: &str) -> Result<Self> {
        let root = parse_xml(xml)?;
        let mut by_id = HashMap::new();
        for rel in root.children_named("Relationship") {
            let (Some(id), Some(target)) = (rel.attr("Id"), rel.attr("Target")) else {
                continue;
            };
            let external = rel.attr("TargetMode") == Some("External");
            let target = if external {
                target.to_string()
            } else {
                resolve_target(base_dir, target)
            };
            by_id.insert(
                id.to_string(),
                Relationship {
                    rel_type: rel.attr("Type").unwrap_or_default().to_string(),
                    target,
                    external,
                },
            );
        }
        Ok(Self { by_id })
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id)
    }

    /// First relationship whose type URI ends in `/{kind}`.
    ///
    /// Transitional and strict packages use different namespace URIs for the
    /// same relationship kinds, so only the last segment is compared.
    #[must_use]
    pub fn by_kind(&self, kind: &str) -> Option<&Relationship> {
        self.by_id
            .values()
            .find(|rel| rel.rel_type.rsplit('/').next() == Some(kind))
    }
}

/// `[Content_Types].xml`: per-extension defaults and per-part overrides
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    pub fn parse(xml: &str) -> Result<Self> {
        let root = parse_xml(xml)?;
        let mut types = Self::default();
        for element in root.elements() {
            let Some(content_type) = element.attr("ContentType") else {
                continue;
            };
            match (element.name.as_str(), element.attr("Extension"), element.attr("PartName")) {
                ("Default", Some(ext), _) => {
                    types
                        .defaults
                        .insert(ext.to_ascii_lowercase(), content_type.to_string());
                }
                ("Override", _, Some(part)) => {
                    types.overrides.insert(
                        part.trim_start_matches('/').to_string(),
                        content_type.to_string(),
                    );
                }
                _ => {}
            }
        }
        Ok(types)
    }

    /// Declared content type of `part`, falling back to well-known image
    /// extensions when the package declares nothing
    #[must_use]
    pub fn lookup(&self, part: &str) -> Option<String> {
        if let Some(declared) = self.overrides.get(part) {
            return Some(declared.clone());
        }
        let ext = part.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())?;
        if let Some(declared) = self.defaults.get(&ext) {
            return Some(declared.clone());
        }
        let guessed = match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "bmp" => "image/bmp",
            "tif" | "tiff" => "image/tiff",
            "webp" => "image/webp",
            "svg" => "image/svg+xml",
            "emf" => "image/x-emf",
            "wmf" => "image/x-wmf",
            _ => return None,
        };
        Some(guessed.to_string())
    }
}
