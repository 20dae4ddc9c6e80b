//! Math typesetting for the preview
//!
//! Walks the text nodes of rendered HTML and swaps every formula span for MathML produced
//! by `latex2mathml`. Text inside `code`, `pre`, `script` and `style` is left alone, and a
//! formula that cannot be converted stays as its raw text (errors never abort a preview).
//! Like client-side auto-render, a span is only recognised when both delimiters sit in the
//! same text node.
//!
//! The MathML is parsed into nodes and grafted in place of the formula text, so nothing
//! the author wrote can redirect where a formula ends up.

use crate::error::RenderError;
use crate::formula::{extract, normalize};
use crate::html::{
    body, create_text, element_name, parse_document, parse_fragment, serialize_children,
    wrap_document, RAW_TEXT_ELEMENTS,
};
use latex2mathml::{latex_to_mathml, DisplayStyle};
use markup5ever_rcdom::{Handle, NodeData};
use std::rc::Rc;
use tracing::debug;

/// Replaces formula spans in an HTML fragment with MathML
#[derive(Debug, Clone, Copy, Default)]
pub struct MathTypesetter;

impl MathTypesetter {
    pub fn new() -> Self {
        MathTypesetter
    }

    /// Typeset every formula in `fragment`, returning the new fragment
    pub fn typeset(&self, fragment: &str) -> Result<String, RenderError> {
        let dom = parse_document(&wrap_document(fragment, ""));
        let body = body(&dom).ok_or_else(|| RenderError::Html("document has no body".to_string()))?;

        replace_formulas(&body);
        serialize_children(&body)
    }
}

fn replace_formulas(node: &Handle) {
    let children: Vec<Handle> = node.children.borrow().clone();
    let mut rebuilt = Vec::with_capacity(children.len());
    let mut changed = false;

    for child in children {
        match &child.data {
            NodeData::Text { contents } => {
                let text = contents.borrow().to_string();
                match split_text(&text) {
                    Some(parts) => {
                        rebuilt.extend(parts);
                        changed = true;
                    }
                    None => rebuilt.push(child.clone()),
                }
            }
            NodeData::Element { .. } => {
                let name = element_name(&child).unwrap_or_default();
                if !RAW_TEXT_ELEMENTS.contains(&name.as_str()) && name != "math" {
                    replace_formulas(&child);
                }
                rebuilt.push(child.clone());
            }
            _ => rebuilt.push(child.clone()),
        }
    }

    if changed {
        for child in &rebuilt {
            child.parent.set(Some(Rc::downgrade(node)));
        }
        *node.children.borrow_mut() = rebuilt;
    }
}

/// Split a text node around its convertible formulas; `None` when nothing changes
fn split_text(text: &str) -> Option<Vec<Handle>> {
    let formulas = extract(text);
    if formulas.is_empty() {
        return None;
    }

    let mut parts = Vec::new();
    let mut cursor = 0;
    for formula in &formulas {
        let Some(offset) = text[cursor..].find(&formula.raw) else {
            continue;
        };
        let Some(markup) = to_mathml(&formula.raw, formula.display) else {
            continue;
        };
        let start = cursor + offset;
        if start > cursor {
            parts.push(create_text(&text[cursor..start]));
        }
        parts.extend(parse_fragment(&markup));
        cursor = start + formula.raw.len();
    }

    if parts.is_empty() {
        return None;
    }
    if cursor < text.len() {
        parts.push(create_text(&text[cursor..]));
    }
    Some(parts)
}

/// MathML wrapped in a preview span, or `None` when the formula cannot be converted
pub fn to_mathml(raw: &str, display: bool) -> Option<String> {
    let latex = normalize(raw);
    if latex.is_empty() {
        return None;
    }
    let (style, class) = if display {
        (DisplayStyle::Block, "math-display")
    } else {
        (DisplayStyle::Inline, "math-inline")
    };

    match latex_to_mathml(&latex, style) {
        Ok(mathml) if !mathml.contains("[PARSE ERROR:") => {
            Some(format!("<span class=\"{class}\">{mathml}</span>"))
        }
        Ok(_) => {
            debug!(%latex, "unsupported LaTeX; leaving formula as text");
            None
        }
        Err(e) => {
            debug!(%latex, error = %e, "LaTeX conversion failed; leaving formula as text");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_formula_becomes_mathml() {
        let out = MathTypesetter::new().typeset("<p>Area $x^2$ here</p>").unwrap();
        assert!(out.starts_with("<p>Area <span class=\"math-inline\"><math"));
        assert!(out.ends_with("</math></span> here</p>"));
        assert!(!out.contains("$x^2$"));
    }

    #[test]
    fn display_formula_uses_block_class() {
        let out = MathTypesetter::new().typeset("<p>$$a + b$$</p>").unwrap();
        assert!(out.contains("<span class=\"math-display\"><math"));
        assert!(out.contains("display=\"block\""));
    }

    #[test]
    fn code_is_left_alone() {
        let out = MathTypesetter::new()
            .typeset("<p><code>$x$</code> and $y$</p>")
            .unwrap();
        assert!(out.contains("<code>$x$</code>"));
        assert!(!out.contains("$y$"));
    }

    #[test]
    fn entity_encoded_text_is_decoded_first() {
        let out = MathTypesetter::new().typeset("<p>$a &lt; b$</p>").unwrap();
        assert!(out.contains("<mo>&lt;</mo>") || out.contains("<mo>&#x3C;</mo>") || out.contains("<mo><</mo>"));
        assert!(!out.contains("$a"));
    }

    #[test]
    fn no_formulas_round_trips() {
        let out = MathTypesetter::new().typeset("<p>plain <em>text</em></p>").unwrap();
        assert_eq!(out, "<p>plain <em>text</em></p>");
    }

    #[test]
    fn author_markup_cannot_capture_a_formula() {
        let out = MathTypesetter::new()
            .typeset("<p><span data-mdmath-slot=\"0\"></span> literal, then $x$</p>")
            .unwrap();
        assert!(out.starts_with("<p><span data-mdmath-slot=\"0\"></span> literal, then <span class=\"math-inline\"><math"));
        assert!(out.ends_with("</math></span></p>"));
    }

    #[test]
    fn repeated_formulas_each_get_mathml() {
        let out = MathTypesetter::new().typeset("<p>$x$ and $x$</p>").unwrap();
        assert_eq!(out.matches("<math").count(), 2);
        assert!(!out.contains('$'));
    }

    #[test]
    fn empty_formula_is_not_converted() {
        assert!(to_mathml("$$  $$", true).is_none());
    }
}
