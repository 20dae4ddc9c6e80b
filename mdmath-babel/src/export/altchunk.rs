//! DOCX via an alternative-format chunk
//!
//! The package holds the HTML as its own part, and the main document body is a single
//! `w:altChunk` pointing at it. Word processors import the HTML when the file is opened,
//! so no WordprocessingML has to be generated from the HTML here.

use super::Exporter;
use crate::error::ExportError;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const CHUNK_PART: &str = "word/afchunk.htm";
const CHUNK_ID: &str = "htmlChunk";

#[derive(Debug, Clone, Copy, Default)]
pub struct AltChunkExporter;

impl AltChunkExporter {
    pub fn new() -> Self {
        AltChunkExporter
    }
}

impl Exporter for AltChunkExporter {
    fn name(&self) -> &str {
        "altchunk"
    }

    fn description(&self) -> &str {
        "DOCX embedding the HTML as an altChunk part"
    }

    fn export(&self, html: &str) -> Result<Vec<u8>, ExportError> {
        if html.trim().is_empty() {
            return Err(ExportError::Generation("HTML document is empty".to_string()));
        }
        build_package(html).map_err(|e| ExportError::Generation(e.to_string()))
    }
}

fn build_package(html: &str) -> zip::result::ZipResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let document = document_xml();
    let document_rels = document_rels_xml();
    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", PACKAGE_RELS_XML),
        ("word/document.xml", document.as_str()),
        ("word/_rels/document.xml.rels", document_rels.as_str()),
        (CHUNK_PART, html),
    ];
    for (path, contents) in parts {
        zip.start_file(path, options)?;
        zip.write_all(contents.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="htm" ContentType="text/html"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

fn document_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <w:body>
    <w:altChunk r:id="{CHUNK_ID}"/>
    <w:sectPr>
      <w:pgSz w:w="11906" w:h="16838"/>
      <w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/>
    </w:sectPr>
  </w:body>
</w:document>"#
    )
}

fn document_rels_xml() -> String {
    let target = CHUNK_PART.trim_start_matches("word/");
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="{CHUNK_ID}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/aFChunk" Target="{target}"/>
</Relationships>"#
    )
}
