//! Formula spans and the values threaded through the pipeline
//!
//!     A [`FormulaSet`] is produced by exactly one extraction pass and is never mutated
//!     afterwards. Every later stage (embedding, normalization, resolution) reads the same
//!     set, so formula indices and placeholder tokens always stay aligned.
//!
//!     extract ──▶ FormulaSet ──▶ embed (raw text) ──▶ normalized() ──▶ resolve
//!
//!     Normalization only ever runs on a set whose raw text has already been consumed by
//!     embedding; see [`crate::placeholder::embed`].

pub mod extract;
pub mod normalize;

pub use extract::{extract, extract_from_html};
pub use normalize::normalize;

use crate::html::decode_entities;
use crate::placeholder::{self, Placeholder};
use serde::{Deserialize, Serialize};

/// Where the text of an extraction pass came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextOrigin {
    /// Author Markdown
    #[default]
    Source,
    /// Rendered HTML, where `<`, `>` and `&` inside formulas arrive entity-encoded
    Html,
}

/// One math span, exactly as matched (delimiters included)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    pub index: usize,
    pub raw: String,
    /// True for the `$$ ... $$` block form
    pub display: bool,
}

impl Formula {
    pub fn placeholder(&self) -> Placeholder {
        Placeholder::for_index(self.index)
    }
}

/// Cleaned LaTeX ready for a native math-object constructor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedFormula {
    pub index: usize,
    pub latex: String,
}

impl NormalizedFormula {
    pub fn placeholder(&self) -> Placeholder {
        Placeholder::for_index(self.index)
    }
}

/// Ordered result of one extraction pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormulaSet {
    formulas: Vec<Formula>,
    origin: TextOrigin,
}

impl FormulaSet {
    pub(crate) fn from_matches<I>(matches: I, origin: TextOrigin) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let formulas = matches
            .into_iter()
            .enumerate()
            .map(|(index, raw)| Formula {
                index,
                display: raw.starts_with("$$"),
                raw,
            })
            .collect();
        Self { formulas, origin }
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Formula> {
        self.formulas.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Formula> {
        self.formulas.iter()
    }

    pub fn origin(&self) -> TextOrigin {
        self.origin
    }

    /// Raw matched spans in index order
    pub fn raws(&self) -> Vec<&str> {
        self.formulas.iter().map(|f| f.raw.as_str()).collect()
    }

    /// Normalized copies of every formula, index-aligned with this set.
    ///
    /// Formulas lifted out of rendered HTML are entity-decoded after normalization so the
    /// math object receives `a<b` rather than `a&lt;b`.
    pub fn normalized(&self) -> Vec<NormalizedFormula> {
        self.formulas
            .iter()
            .map(|formula| {
                let latex = normalize(&formula.raw);
                let latex = match self.origin {
                    TextOrigin::Source => latex,
                    TextOrigin::Html => decode_entities(&latex),
                };
                NormalizedFormula {
                    index: formula.index,
                    latex,
                }
            })
            .collect()
    }

    /// Whether `text` already holds a literal placeholder-shaped token, which would make
    /// resolution ambiguous.
    pub fn collides_with(&self, text: &str) -> bool {
        !self.is_empty() && placeholder::contains_placeholder(text)
    }
}

impl<'a> IntoIterator for &'a FormulaSet {
    type Item = &'a Formula;
    type IntoIter = std::slice::Iter<'a, Formula>;

    fn into_iter(self) -> Self::IntoIter {
        self.formulas.iter()
    }
}
