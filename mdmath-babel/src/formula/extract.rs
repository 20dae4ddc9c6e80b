//! Formula extraction
//!
//! Scans text left to right for `$$ ... $$` (block) or `$ ... $` (inline) spans. The
//! block alternative is tried first at every position, so `$$x$$` is one block formula
//! rather than two empty inline ones. Matches never overlap and duplicates are kept.

use super::{FormulaSet, TextOrigin};
use once_cell::sync::Lazy;
use regex::Regex;

static FORMULA_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\$[\s\S]*?\$\$|\$[^$]+\$").expect("formula pattern must compile")
});

/// Extract every formula span from author text
pub fn extract(text: &str) -> FormulaSet {
    FormulaSet::from_matches(find_spans(text), TextOrigin::Source)
}

/// Extract every formula span from rendered HTML
///
/// The raw spans keep their entity encoding so they can be found verbatim in the same
/// HTML during embedding.
pub fn extract_from_html(html: &str) -> FormulaSet {
    FormulaSet::from_matches(find_spans(html), TextOrigin::Html)
}

fn find_spans(text: &str) -> Vec<String> {
    FORMULA_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .collect()
}
