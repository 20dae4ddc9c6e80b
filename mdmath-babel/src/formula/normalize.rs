//! Formula normalization
//!
//! Produces the single-line LaTeX handed to a native math-object constructor:
//!
//! 1. carriage returns are dropped and real line breaks (with surrounding whitespace)
//!    become one space;
//! 2. explicit LaTeX line breaks (`\\`, `\\*`, `\\[2pt]`, `\\*[2pt]`) become one space;
//! 3. one layer of math delimiters is stripped, trying `$$`, `$`, `\( \)` and `\[ \]` in
//!    that order; the first style present at either edge wins;
//! 4. whitespace runs collapse to one space and the ends are trimmed.
//!
//! The output is never used to find placeholders: it no longer matches the text that was
//! embedded.

use once_cell::sync::Lazy;
use regex::Regex;

static LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\n\s*").expect("line break pattern must compile"));

static LATEX_LINE_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\\\\*?(?:\[[^\]]*\])?\*?").expect("latex line break pattern must compile")
});

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{2,}").expect("whitespace pattern must compile"));

/// Delimiter pairs in stripping precedence
const DELIMITERS: [(&str, &str); 4] = [("$$", "$$"), ("$", "$"), ("\\(", "\\)"), ("\\[", "\\]")];

/// Normalize one raw formula span
pub fn normalize(raw: &str) -> String {
    let text = raw.trim().replace('\r', "");
    let text = LINE_BREAK.replace_all(&text, " ");
    let text = LATEX_LINE_BREAK.replace_all(&text, " ");
    let text = strip_delimiters(&text);
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

fn strip_delimiters(text: &str) -> &str {
    let text = text.trim();
    for (open, close) in DELIMITERS {
        let opens = text.starts_with(open);
        let closes = text.ends_with(close);
        if !opens && !closes {
            continue;
        }

        let mut inner = text;
        if opens {
            inner = &inner[open.len()..];
        }
        if closes && inner.ends_with(close) {
            inner = &inner[..inner.len() - close.len()];
        }
        return inner.trim();
    }
    text
}
