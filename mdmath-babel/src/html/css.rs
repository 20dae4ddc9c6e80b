//! Stylesheet reading for style inlining
//!
//! Sheets are parsed with lightningcss in error-recovery mode, so a malformed rule is
//! dropped without losing the rest of the sheet. Only top-level style rules are kept;
//! at-rules (`@media`, `@font-face`, `@page`, ...) are skipped along with everything
//! nested inside them. Declarations are re-printed as `name: value;` pairs joined by a
//! space, which is the text written into `style` attributes.

use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet as ParsedSheet};
use lightningcss::traits::ToCss;
use tracing::debug;

/// One style rule: its selector list text and declaration text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub selectors: String,
    pub declarations: String,
}

/// A stylesheet as seen by the inliner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleSheet {
    /// Stylesheet text available in-process
    Embedded(String),
    /// A stylesheet referenced by URL; its rules cannot be introspected
    Linked { href: String },
}

impl StyleSheet {
    pub fn embedded(text: impl Into<String>) -> Self {
        StyleSheet::Embedded(text.into())
    }

    /// Rules of this sheet; linked sheets yield none
    pub fn rules(&self) -> Vec<StyleRule> {
        match self {
            StyleSheet::Embedded(text) => parse_rules(text),
            StyleSheet::Linked { href } => {
                debug!(%href, "skipping stylesheet that cannot be introspected");
                Vec::new()
            }
        }
    }
}

/// Parse the top-level style rules of a stylesheet
pub fn parse_rules(css: &str) -> Vec<StyleRule> {
    let options = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };
    let sheet = match ParsedSheet::parse(css, options) {
        Ok(sheet) => sheet,
        Err(e) => {
            debug!(error = %e, "stylesheet could not be parsed; skipped");
            return Vec::new();
        }
    };

    sheet
        .rules
        .0
        .iter()
        .filter_map(|rule| match rule {
            CssRule::Style(style) => {
                let selectors = style.selectors.to_css_string(PrinterOptions::default()).ok()?;
                let block = &style.declarations;
                let declarations = block
                    .declarations
                    .iter()
                    .map(|property| (property, false))
                    .chain(block.important_declarations.iter().map(|property| (property, true)))
                    .filter_map(|(property, important)| {
                        property.to_css_string(important, PrinterOptions::default()).ok()
                    })
                    .map(|declaration| format!("{declaration};"))
                    .collect::<Vec<_>>();
                if declarations.is_empty() {
                    return None;
                }
                Some(StyleRule {
                    selectors,
                    declarations: declarations.join(" "),
                })
            }
            _ => None,
        })
        .collect()
}
