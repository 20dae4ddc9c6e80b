use crate::common::fixture;
use mdmath_babel::error::ExportError;
use mdmath_babel::export::altchunk::CHUNK_PART;
use mdmath_babel::export::{Exporter, ExporterRegistry, DOCX_MEDIA_TYPE};
use mdmath_babel::publish::{publish_with, PublishArtifact, PublishOptions, PublishSpec};
use mdmath_babel::{publish, ComrakRenderer};
use std::fs;
use std::io::{Cursor, Read};
use tempfile::tempdir;

struct FailingExporter;

impl Exporter for FailingExporter {
    fn name(&self) -> &str {
        "failing"
    }

    fn description(&self) -> &str {
        "always fails"
    }

    fn export(&self, _html: &str) -> Result<Vec<u8>, ExportError> {
        Err(ExportError::Generation("converter crashed".to_string()))
    }
}

struct OfflineExporter;

impl Exporter for OfflineExporter {
    fn name(&self) -> &str {
        "offline"
    }

    fn description(&self) -> &str {
        "never available"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn export(&self, _html: &str) -> Result<Vec<u8>, ExportError> {
        panic!("an unavailable exporter must not be called")
    }
}

fn registry() -> ExporterRegistry {
    let mut registry = ExporterRegistry::with_defaults();
    registry.register(FailingExporter);
    registry.register(OfflineExporter);
    registry
}

fn read_part(docx: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut contents = String::new();
    part.read_to_string(&mut contents).unwrap();
    contents
}

#[test]
fn altchunk_docx_carries_styled_html() {
    let result = publish(PublishSpec::new("# Title\n\nArea is $x^2$.")).unwrap();
    assert!(!result.fell_back);

    let PublishArtifact::InMemory(artifact) = result.artifact else {
        panic!("expected an in-memory artifact");
    };
    assert_eq!(artifact.file_name, "document-from-md.docx");
    assert_eq!(artifact.media_type, DOCX_MEDIA_TYPE);

    let document = read_part(&artifact.bytes, "word/document.xml");
    assert!(document.contains("w:altChunk"));
    let chunk = read_part(&artifact.bytes, CHUNK_PART);
    assert!(chunk.contains("font-family:Arial,Helvetica,sans-serif"));
    assert!(chunk.contains("<h1 style="));
    assert!(chunk.contains("<math"));
}

#[test]
fn written_file_lands_in_directory() {
    let dir = tempdir().unwrap();
    let result = publish(PublishSpec::new(&fixture("kitchensink.md")).with_output_path(dir.path())).unwrap();

    let PublishArtifact::File(path) = result.artifact else {
        panic!("expected a file artifact");
    };
    assert_eq!(path, dir.path().join("document-from-md.docx"));
    assert!(fs::read(&path).unwrap().starts_with(b"PK"));
}

#[test]
fn failing_exporter_reports_error_and_writes_nothing() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("out.docx");
    let renderer = ComrakRenderer::default();
    let spec = PublishSpec::new("$x$")
        .with_exporter("failing")
        .with_output_path(&target);

    let err = publish_with(&registry(), &renderer, spec).unwrap_err();
    assert!(matches!(err, ExportError::Generation(ref msg) if msg.contains("converter crashed")));
    assert!(!target.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn unavailable_exporter_falls_back_to_html() {
    let dir = tempdir().unwrap();
    let renderer = ComrakRenderer::default();
    let spec = PublishSpec::new("Energy $E = mc^2$")
        .with_exporter("offline")
        .with_output_path(dir.path().join("notes.docx"));

    let result = publish_with(&registry(), &renderer, spec).unwrap();
    assert!(result.fell_back);
    let PublishArtifact::File(path) = result.artifact else {
        panic!("expected a file artifact");
    };
    assert_eq!(path, dir.path().join("notes.html"));
    let html = fs::read_to_string(path).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<math"));
}

#[test]
fn unknown_exporter_is_an_error() {
    let err = publish(PublishSpec::new("text").with_exporter("rtf")).unwrap_err();
    assert!(matches!(err, ExportError::ExporterNotFound(ref name) if name == "rtf"));
}

#[test]
fn custom_css_is_inlined_after_defaults() {
    let options = PublishOptions {
        custom_css: Some("p { text-align: center; }".to_string()),
        typeset_math: false,
        ..PublishOptions::default()
    };
    let result = publish(PublishSpec::new("Plain $x$").with_options(options)).unwrap();
    let PublishArtifact::InMemory(artifact) = result.artifact else {
        panic!("expected an in-memory artifact");
    };

    let chunk = read_part(&artifact.bytes, CHUNK_PART);
    assert!(chunk.contains("text-align: center;"));
    assert!(chunk.contains("$x$"));
    assert!(!chunk.contains("<math"));
}
