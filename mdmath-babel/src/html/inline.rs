//! Style inlining
//!
//! Document exporters ignore `<style>` and `<link>` sheets, so presentation is flattened
//! into `style` attributes before export. For `<body>` and every element inside it the
//! declarations of all matching rules are concatenated in sheet order and written as the
//! element's own inline style, replacing whatever was there. Elements that no rule
//! matches lose their inline style. Running the inliner twice gives the same result.
//!
//! Selector matching is done by `scraper` (Servo's `selectors` engine) on its own parse of
//! the document. Both trees come out of the html5ever tree builder for the same text, so
//! elements are paired up by their position in document order.

use super::css::{StyleRule, StyleSheet};
use super::{element_name, get_attr, parse_document, remove_attr, serialize_document, set_attr};
use crate::error::RenderError;
use markup5ever_rcdom::{Handle, NodeData};
use scraper::{Html, Selector};
use std::collections::HashMap;
use tracing::debug;

/// Declarations per element, indexed by document order
fn match_rules(html: &str, rules: &[StyleRule]) -> Vec<Vec<String>> {
    let document = Html::parse_document(html);
    let order: HashMap<_, usize> = document
        .tree
        .root()
        .descendants()
        .filter(|node| node.value().is_element())
        .enumerate()
        .map(|(index, node)| (node.id(), index))
        .collect();

    let mut styles = vec![Vec::new(); order.len()];
    for rule in rules {
        let selector = match Selector::parse(&rule.selectors) {
            Ok(selector) => selector,
            Err(e) => {
                debug!(selector = %rule.selectors, error = %e, "unsupported selector; rule skipped");
                continue;
            }
        };
        for element in document.select(&selector) {
            if let Some(&index) = order.get(&element.id()) {
                styles[index].push(rule.declarations.clone());
            }
        }
    }
    styles
}

/// Write the matched declarations onto `<body>` and its descendants, walking in document
/// order; `position` ends at the number of elements seen.
fn apply(node: &Handle, styles: &[Vec<String>], position: &mut usize, in_body: bool) {
    let mut in_body = in_body;
    if let NodeData::Element { .. } = node.data {
        let index = *position;
        *position += 1;
        in_body = in_body || element_name(node).as_deref() == Some("body");
        if in_body {
            match styles.get(index) {
                Some(declarations) if !declarations.is_empty() => {
                    set_attr(node, "style", &declarations.join(" "))
                }
                _ => remove_attr(node, "style"),
            }
        }
    }
    for child in node.children.borrow().iter() {
        apply(child, styles, position, in_body);
    }
    // scraper keeps template contents as ordinary children
    if let NodeData::Element { template_contents, .. } = &node.data {
        if let Some(contents) = template_contents.borrow().as_ref() {
            for child in contents.children.borrow().iter() {
                apply(child, styles, position, in_body);
            }
        }
    }
}

/// Inline styles throughout the `<body>` of a complete HTML document
///
/// `extra_sheets` come first, followed by every `<style>` element and every
/// `<link rel="stylesheet">` (skipped) found in the document. Returns the re-serialized
/// document.
pub fn inline_styles_in_html(html: &str, extra_sheets: &[StyleSheet]) -> Result<String, RenderError> {
    let dom = parse_document(html);
    let mut sheets = extra_sheets.to_vec();
    collect_document_sheets(&dom.document, &mut sheets);

    let rules: Vec<StyleRule> = sheets.iter().flat_map(StyleSheet::rules).collect();
    debug!(rules = rules.len(), "inlining stylesheet rules");
    let styles = match_rules(html, &rules);

    let mut seen = 0;
    apply(&dom.document, &styles, &mut seen, false);
    if seen != styles.len() {
        return Err(RenderError::Html(format!(
            "element count mismatch while inlining styles ({seen} vs {})",
            styles.len()
        )));
    }
    serialize_document(&dom)
}

fn collect_document_sheets(node: &Handle, sheets: &mut Vec<StyleSheet>) {
    match element_name(node).as_deref() {
        Some("style") => {
            let mut text = String::new();
            for child in node.children.borrow().iter() {
                if let NodeData::Text { contents } = &child.data {
                    text.push_str(&contents.borrow());
                }
            }
            sheets.push(StyleSheet::Embedded(text));
        }
        Some("link") => {
            let is_sheet = get_attr(node, "rel")
                .map(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("stylesheet")))
                .unwrap_or(false);
            if is_sheet {
                sheets.push(StyleSheet::Linked {
                    href: get_attr(node, "href").unwrap_or_default(),
                });
            }
        }
        _ => {
            for child in node.children.borrow().iter() {
                collect_document_sheets(child, sheets);
            }
        }
    }
}
