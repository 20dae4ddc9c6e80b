//! Document publishing pipeline.
//!
//! Turns Markdown into a downloadable document in one call: render, typeset math, flatten
//! stylesheets into inline styles, wrap into a complete HTML document, then hand it to
//! an exporter. When the exporter cannot run, the wrapped HTML itself is published
//! under the HTML file name instead, and that is not an error. When the exporter runs
//! and fails, nothing is written.
//!
//! For more control over the conversion, use [`ExporterRegistry`] and the render module
//! directly.

use crate::error::ExportError;
use crate::export::ExporterRegistry;
use crate::html::{body_html, inline_styles_in_html, parse_document, wrap_document, StyleSheet};
use crate::render::{default_css, ComrakRenderer, MarkupRenderer, MathTypesetter, RenderOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DOCX_FILE_NAME: &str = "document-from-md.docx";
pub const HTML_FILE_NAME: &str = "document-from-md.html";
pub const DEFAULT_BODY_FONT: &str = "Arial,Helvetica,sans-serif";
pub const HTML_MEDIA_TYPE: &str = "text/html;charset=utf-8";

/// A named file ready to be offered for download or written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn html(file_name: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: HTML_MEDIA_TYPE.to_string(),
            bytes: html.into().into_bytes(),
        }
    }

    /// Write to `path`, or into `path` when it is an existing directory
    pub fn write_to(&self, path: &Path) -> Result<PathBuf, ExportError> {
        let target = if path.is_dir() {
            path.join(&self.file_name)
        } else {
            path.to_path_buf()
        };
        fs::write(&target, &self.bytes).map_err(|source| ExportError::Write {
            path: target.display().to_string(),
            source,
        })?;
        info!(path = %target.display(), bytes = self.bytes.len(), "artifact written");
        Ok(target)
    }
}

/// Knobs of the export path, mirrored by the `[export]` and `[render]` configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOptions {
    pub exporter: String,
    pub body_font: String,
    pub docx_file_name: String,
    pub html_file_name: String,
    /// Extra stylesheet inlined after the built-in one
    pub custom_css: Option<String>,
    pub typeset_math: bool,
    pub render: RenderOptions,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            exporter: "altchunk".to_string(),
            body_font: DEFAULT_BODY_FONT.to_string(),
            docx_file_name: DOCX_FILE_NAME.to_string(),
            html_file_name: HTML_FILE_NAME.to_string(),
            custom_css: None,
            typeset_math: true,
            render: RenderOptions::default(),
        }
    }
}

/// Specifies how to publish a document.
///
/// ```ignore
/// let spec = PublishSpec::new("# Notes\n\n$x^2$")
///     .with_exporter("pandoc")
///     .with_output_path("out/");
/// ```
///
/// Without an output path the artifact is returned in memory.
#[derive(Debug, Clone)]
pub struct PublishSpec<'a> {
    pub source: &'a str,
    /// File path, or an existing directory to place the artifact in
    pub output: Option<PathBuf>,
    pub options: PublishOptions,
}

impl<'a> PublishSpec<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            output: None,
            options: PublishOptions::default(),
        }
    }

    pub fn with_output_path(mut self, path: impl AsRef<Path>) -> Self {
        self.output = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_exporter(mut self, name: impl Into<String>) -> Self {
        self.options.exporter = name.into();
        self
    }

    pub fn with_options(mut self, options: PublishOptions) -> Self {
        self.options = options;
        self
    }
}

/// The output from a successful publish operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishArtifact {
    InMemory(Artifact),
    /// Path to the written file
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishResult {
    pub artifact: PublishArtifact,
    /// True when the exporter was unavailable and HTML was published instead
    pub fell_back: bool,
}

/// Publishes with the built-in exporters and the comrak renderer
pub fn publish(spec: PublishSpec<'_>) -> Result<PublishResult, ExportError> {
    let registry = ExporterRegistry::with_defaults();
    let renderer = ComrakRenderer::new(spec.options.render.clone());
    publish_with(&registry, &renderer, spec)
}

/// Publishes with an explicit registry and renderer
pub fn publish_with(
    registry: &ExporterRegistry,
    renderer: &dyn MarkupRenderer,
    spec: PublishSpec<'_>,
) -> Result<PublishResult, ExportError> {
    let options = &spec.options;
    let exporter = registry.get(&options.exporter)?;
    let html = export_html(renderer, spec.source, options)?;

    let (artifact, fell_back) = if exporter.is_available() {
        let bytes = exporter.export(&html)?;
        debug!(exporter = exporter.name(), bytes = bytes.len(), "document exported");
        let artifact = Artifact {
            file_name: options.docx_file_name.clone(),
            media_type: exporter.media_type().to_string(),
            bytes,
        };
        (artifact, false)
    } else {
        info!(exporter = exporter.name(), "exporter unavailable; publishing HTML instead");
        (Artifact::html(options.html_file_name.clone(), html), true)
    };

    let artifact = match spec.output {
        None => PublishArtifact::InMemory(artifact),
        Some(path) => {
            let path = if fell_back { html_sibling(&path) } else { path };
            PublishArtifact::File(artifact.write_to(&path)?)
        }
    };
    Ok(PublishResult { artifact, fell_back })
}

/// The complete, style-inlined HTML document handed to exporters
pub fn export_html(
    renderer: &dyn MarkupRenderer,
    source: &str,
    options: &PublishOptions,
) -> Result<String, ExportError> {
    let rendered = renderer.render(source)?;
    let rendered = if options.typeset_math {
        MathTypesetter::new().typeset(&rendered).unwrap_or_else(|e| {
            debug!(error = %e, "math typesetting skipped");
            rendered
        })
    } else {
        rendered
    };

    let mut sheets = vec![StyleSheet::embedded(default_css())];
    if let Some(css) = &options.custom_css {
        sheets.push(StyleSheet::embedded(css.clone()));
    }
    let inlined = inline_styles_in_html(&wrap_document(&rendered, ""), &sheets)?;
    let body = body_html(&parse_document(&inlined))?;

    let head = format!("<style>body{{font-family:{}}}</style>", options.body_font);
    Ok(wrap_document(&body, &head))
}

/// Swap a `.docx` target for `.html` when publishing the fallback to a file path
fn html_sibling(path: &Path) -> PathBuf {
    if path.is_dir() {
        return path.to_path_buf();
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("docx") => path.with_extension("html"),
        _ => path.to_path_buf(),
    }
}
