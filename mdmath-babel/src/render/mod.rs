//! Markdown rendering
//!
//! # Library Choice
//!
//! We use the `comrak` crate for Markdown → HTML. It is CommonMark compliant, supports the
//! usual extensions (tables, strikethrough, autolinks) and can pass raw HTML through,
//! which matches an author-facing editor where `<br>` or `<sub>` in the source is meant
//! literally.
//!
//! comrak is deliberately run without its math extension: formulas must survive the
//! render as plain `$...$` text so that placeholder embedding can find them verbatim.
//! Visual typesetting of math happens afterwards, and only for the preview (see
//! [`typeset`]).

pub mod debounce;
pub mod preview;
pub mod typeset;

pub use debounce::Debouncer;
pub use preview::{Preview, PreviewOutput};
pub use typeset::MathTypesetter;

use crate::error::RenderError;
use comrak::{markdown_to_html, Options};

/// Markdown → HTML renderer seam
pub trait MarkupRenderer: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Render a Markdown document to an HTML fragment
    fn render(&self, markdown: &str) -> Result<String, RenderError>;
}

/// Renderer knobs, mirrored by the `[render]` configuration section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Pass raw HTML in the source through untouched
    pub allow_html: bool,
    /// Turn bare URLs into links
    pub autolink: bool,
    pub tables: bool,
    pub strikethrough: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            allow_html: true,
            autolink: true,
            tables: true,
            strikethrough: true,
        }
    }
}

/// CommonMark renderer backed by comrak
#[derive(Debug, Clone, Default)]
pub struct ComrakRenderer {
    options: RenderOptions,
}

impl ComrakRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    fn comrak_options(&self) -> Options<'static> {
        let mut options = Options::default();
        options.extension.table = self.options.tables;
        options.extension.strikethrough = self.options.strikethrough;
        options.extension.autolink = self.options.autolink;
        options.render.unsafe_ = self.options.allow_html;
        options
    }
}

impl MarkupRenderer for ComrakRenderer {
    fn name(&self) -> &str {
        "comrak"
    }

    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        Ok(markdown_to_html(markdown, &self.comrak_options()))
    }
}

/// Stylesheet used by the preview and inlined on export
pub fn default_css() -> &'static str {
    include_str!("../../css/preview.css")
}
