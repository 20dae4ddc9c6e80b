//! Placeholder tokens
//!
//! Destinations that do not understand LaTeX receive `{formula<index>}` in place of each
//! formula. The closing brace keeps `{formula1}` from matching inside `{formula10}`, and
//! the token never contains `$`, so a later raw formula can never match inside an
//! earlier placeholder.
//!
//! Embedding is literal substring replacement: for each formula, in index order, the
//! first remaining occurrence of its raw text is replaced. A formula whose raw text is
//! absent (the renderer changed whitespace or entities) is a soft miss: it stays visible
//! as text and no placeholder is produced for it.

use crate::formula::FormulaSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use tracing::debug;

static PLACEHOLDER_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{formula\d+\}").expect("placeholder pattern must compile"));

/// Index-keyed token standing in for one formula
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placeholder(String);

impl Placeholder {
    pub fn for_index(index: usize) -> Self {
        Placeholder(format!("{{formula{index}}}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether text already carries something shaped like a placeholder
pub fn contains_placeholder(text: &str) -> bool {
    PLACEHOLDER_SHAPE.is_match(text)
}

/// Which text the single extraction pass and the substitution operate on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderStrategy {
    /// Render first, then extract from and embed into the rendered HTML
    ///
    /// Formulas are read after the Markdown renderer has applied backslash escapes, so
    /// `\\` arrives as `\` and `\{` as `{`. Use [`PlaceholderStrategy::Source`] when
    /// the LaTeX must reach the math object exactly as written.
    #[default]
    Html,
    /// Extract from and embed into the Markdown source, then render; the renderer carries
    /// placeholders through as plain text so no formula can be missed
    Source,
}

impl PlaceholderStrategy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "html" => Some(PlaceholderStrategy::Html),
            "source" => Some(PlaceholderStrategy::Source),
            _ => None,
        }
    }
}

/// Text with placeholders substituted for formulas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embedded {
    pub text: String,
    /// Indices that received a placeholder
    pub embedded: Vec<usize>,
    /// Indices whose raw text was not found
    pub missed: Vec<usize>,
}

impl Embedded {
    pub fn is_complete(&self) -> bool {
        self.missed.is_empty()
    }
}

/// Replace each formula's first remaining occurrence with its placeholder
pub fn embed(text: &str, formulas: &FormulaSet) -> Embedded {
    let mut output = text.to_string();
    let mut embedded = Vec::with_capacity(formulas.len());
    let mut missed = Vec::new();

    for formula in formulas {
        match output.find(&formula.raw) {
            Some(start) => {
                let token = formula.placeholder();
                output.replace_range(start..start + formula.raw.len(), token.as_str());
                embedded.push(formula.index);
            }
            None => {
                debug!(index = formula.index, raw = %formula.raw, "formula not found verbatim; left as text");
                missed.push(formula.index);
            }
        }
    }

    Embedded {
        text: output,
        embedded,
        missed,
    }
}
