//! Shared fixtures: in-memory Word packages and image store doubles.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use docx_markdown::ImageStore;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const NAMESPACES: &str = concat!(
    r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture" "#,
    r#"xmlns:v="urn:schemas-microsoft-com:vml" "#,
    r#"xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math""#,
);

const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

struct Rel {
    id: String,
    kind: String,
    target: String,
    external: bool,
}

/// Builds a minimal `.docx` package around a body fragment
#[derive(Default)]
pub struct DocxBuilder {
    body: String,
    rels: Vec<Rel>,
    parts: Vec<(String, Vec<u8>)>,
    numbering: Option<String>,
    styles: Option<String>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw WordprocessingML to `w:body`
    pub fn body(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    pub fn rel(mut self, id: &str, kind: &str, target: &str, external: bool) -> Self {
        self.rels.push(Rel {
            id: id.to_string(),
            kind: kind.to_string(),
            target: target.to_string(),
            external,
        });
        self
    }

    /// Image relationship plus its media part under `word/`
    pub fn image(self, id: &str, target: &str, bytes: &[u8]) -> Self {
        self.rel(id, "image", target, false)
            .part(&format!("word/{target}"), bytes)
    }

    pub fn part(mut self, name: &str, bytes: &[u8]) -> Self {
        self.parts.push((name.to_string(), bytes.to_vec()));
        self
    }

    /// `numbering.xml` content inside `w:numbering`
    pub fn numbering(mut self, xml: &str) -> Self {
        self.numbering = Some(xml.to_string());
        self
    }

    /// `styles.xml` content inside `w:styles`
    pub fn styles(mut self, xml: &str) -> Self {
        self.styles = Some(xml.to_string());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let mut add = |name: &str, bytes: &[u8]| {
            zip.start_file(name, SimpleFileOptions::default())
                .expect("start zip entry");
            zip.write_all(bytes).expect("write zip entry");
        };

        add(
            "[Content_Types].xml",
            br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Default Extension="jpeg" ContentType="image/jpeg"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#,
        );
        add(
            "_rels/.rels",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL_BASE}/officeDocument" Target="word/document.xml"/></Relationships>"#
            )
            .as_bytes(),
        );

        let mut rels = String::new();
        for rel in &self.rels {
            rels.push_str(&format!(
                r#"<Relationship Id="{}" Type="{REL_BASE}/{}" Target="{}"{}/>"#,
                rel.id,
                rel.kind,
                rel.target,
                if rel.external { r#" TargetMode="External""# } else { "" }
            ));
        }
        if let Some(numbering) = &self.numbering {
            rels.push_str(&format!(
                r#"<Relationship Id="rIdNumbering" Type="{REL_BASE}/numbering" Target="numbering.xml"/>"#
            ));
            add(
                "word/numbering.xml",
                format!("<w:numbering {NAMESPACES}>{numbering}</w:numbering>").as_bytes(),
            );
        }
        if let Some(styles) = &self.styles {
            rels.push_str(&format!(
                r#"<Relationship Id="rIdStyles" Type="{REL_BASE}/styles" Target="styles.xml"/>"#
            ));
            add(
                "word/styles.xml",
                format!("<w:styles {NAMESPACES}>{styles}</w:styles>").as_bytes(),
            );
        }
        add(
            "word/_rels/document.xml.rels",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
            )
            .as_bytes(),
        );
        add(
            "word/document.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {NAMESPACES}><w:body>{}<w:sectPr/></w:body></w:document>"#,
                self.body
            )
            .as_bytes(),
        );
        for (name, bytes) in &self.parts {
            add(name, bytes);
        }

        zip.finish().expect("finish zip").into_inner()
    }

    pub fn write_to(&self, path: &Path) {
        std::fs::write(path, self.build()).expect("write docx fixture");
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// `<w:p>` with one plain run
pub fn paragraph(text: &str) -> String {
    format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, escape(text))
}

/// `<w:p>` with paragraph style `style`
pub fn styled_paragraph(style: &str, text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="{style}"/></w:pPr><w:r><w:t>{}</w:t></w:r></w:p>"#,
        escape(text)
    )
}

/// Numbered paragraph
pub fn list_item(num_id: &str, ilvl: u8, text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="{ilvl}"/><w:numId w:val="{num_id}"/></w:numPr></w:pPr><w:r><w:t>{}</w:t></w:r></w:p>"#,
        escape(text)
    )
}

/// Run holding an inline DrawingML picture
pub fn drawing_run(rel_id: &str, descr: &str) -> String {
    format!(
        r#"<w:r><w:drawing><wp:inline><wp:extent cx="100" cy="100"/><wp:docPr id="1" name="Picture 1" descr="{descr}"/><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic><pic:blipFill><a:blip r:embed="{rel_id}"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#
    )
}

/// Paragraph holding one picture
pub fn image_paragraph(rel_id: &str) -> String {
    format!("<w:p>{}</w:p>", drawing_run(rel_id, ""))
}

/// `<w:tc>` with one paragraph; `props` goes inside `w:tcPr`
pub fn cell(props: &str, text: &str) -> String {
    let tc_pr = if props.is_empty() {
        String::new()
    } else {
        format!("<w:tcPr>{props}</w:tcPr>")
    };
    format!("<w:tc>{tc_pr}{}</w:tc>", paragraph(text))
}

/// `<w:tbl>` from rows of already-built cells
pub fn table(rows: &[Vec<String>]) -> String {
    let rows: String = rows
        .iter()
        .map(|cells| format!("<w:tr>{}</w:tr>", cells.concat()))
        .collect();
    format!("<w:tbl><w:tblPr/><w:tblGrid/>{rows}</w:tbl>")
}

/// Image store that records writes and fails on selected call numbers (1-based)
#[derive(Default)]
pub struct FailingStore {
    fail_on: Vec<usize>,
    calls: Mutex<usize>,
    pub written: Mutex<Vec<PathBuf>>,
}

impl FailingStore {
    pub fn failing_on(calls: &[usize]) -> Self {
        Self {
            fail_on: calls.to_vec(),
            ..Self::default()
        }
    }

    pub fn written(&self) -> Vec<PathBuf> {
        self.written.lock().expect("lock").clone()
    }
}

impl ImageStore for FailingStore {
    fn write(&self, path: &Path, _bytes: &[u8]) -> std::io::Result<()> {
        let mut calls = self.calls.lock().expect("lock");
        *calls += 1;
        if self.fail_on.contains(&*calls) {
            return Err(std::io::Error::other("disk full"));
        }
        self.written.lock().expect("lock").push(path.to_path_buf());
        Ok(())
    }
}
