//! Live preview
//!
//! The preview never fails: a missing renderer or a renderer error becomes an inline
//! message in the preview HTML, and later operations proceed as usual.

use super::{MarkupRenderer, MathTypesetter};
use crate::formula::{extract, FormulaSet};
use crate::html::escape_html;
use tracing::{debug, warn};

pub const MISSING_RENDERER_HTML: &str = "<em>No Markdown renderer loaded.</em>";

/// What the preview pane shows for one source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewOutput {
    /// Preview HTML, math typeset when a typesetter is configured
    pub html: String,
    /// Formulas found in the source, for display and logging
    pub formulas: FormulaSet,
    /// False when `html` is an error message rather than rendered content
    pub rendered: bool,
}

pub struct Preview {
    renderer: Option<Box<dyn MarkupRenderer>>,
    typesetter: Option<MathTypesetter>,
}

impl Preview {
    pub fn new(renderer: Box<dyn MarkupRenderer>) -> Self {
        Self {
            renderer: Some(renderer),
            typesetter: Some(MathTypesetter::new()),
        }
    }

    /// A preview with nothing to render with
    pub fn without_renderer() -> Self {
        Self {
            renderer: None,
            typesetter: None,
        }
    }

    pub fn with_typesetting(mut self, enabled: bool) -> Self {
        self.typesetter = enabled.then(MathTypesetter::new);
        self
    }

    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    pub fn render(&self, source: &str) -> PreviewOutput {
        let formulas = extract(source);
        debug!(count = formulas.len(), "formulas in source");
        if formulas.collides_with(source) {
            warn!("source already contains a placeholder-shaped token; insertion may be ambiguous");
        }

        let Some(renderer) = &self.renderer else {
            return PreviewOutput {
                html: MISSING_RENDERER_HTML.to_string(),
                formulas,
                rendered: false,
            };
        };

        let html = match renderer.render(source) {
            Ok(html) => html,
            Err(e) => {
                debug!(renderer = renderer.name(), error = %e, "render failed");
                return PreviewOutput {
                    html: format!(
                        "<pre style=\"color:red;\">{}</pre>",
                        escape_html(&e.to_string())
                    ),
                    formulas,
                    rendered: false,
                };
            }
        };

        let html = match &self.typesetter {
            Some(typesetter) => typesetter.typeset(&html).unwrap_or_else(|e| {
                debug!(error = %e, "math typesetting skipped");
                html
            }),
            None => html,
        };

        PreviewOutput {
            html,
            formulas,
            rendered: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::render::ComrakRenderer;

    struct FailingRenderer;

    impl MarkupRenderer for FailingRenderer {
        fn name(&self) -> &str {
            "failing"
        }

        fn render(&self, _markdown: &str) -> Result<String, RenderError> {
            Err(RenderError::Markdown("unexpected <token>".to_string()))
        }
    }

    #[test]
    fn missing_renderer_shows_message() {
        let output = Preview::without_renderer().render("# Title $x$");
        assert_eq!(output.html, MISSING_RENDERER_HTML);
        assert!(!output.rendered);
        assert_eq!(output.formulas.len(), 1);
    }

    #[test]
    fn renderer_error_is_shown_inline() {
        let output = Preview::new(Box::new(FailingRenderer)).render("text");
        assert_eq!(
            output.html,
            "<pre style=\"color:red;\">Error parsing Markdown: unexpected &lt;token&gt;</pre>"
        );
        assert!(!output.rendered);
    }

    #[test]
    fn typesets_math_by_default() {
        let output = Preview::new(Box::new(ComrakRenderer::default())).render("Area $x^2$");
        assert!(output.rendered);
        assert!(output.html.contains("<span class=\"math-inline\"><math"));
    }

    #[test]
    fn typesetting_can_be_disabled() {
        let output = Preview::new(Box::new(ComrakRenderer::default()))
            .with_typesetting(false)
            .render("Area $x^2$");
        assert_eq!(output.html, "<p>Area $x^2$</p>\n");
    }

    #[test]
    fn no_formulas_renders_normally() {
        let output = Preview::new(Box::new(ComrakRenderer::default())).render("*plain*");
        assert!(output.formulas.is_empty());
        assert_eq!(output.html.trim_end(), "<p><em>plain</em></p>");
    }
}
