//! Insertion through an in-memory host: paste, then resolve placeholders to math objects

use crate::common::fixture;
use mdmath_babel::bridge::{resolve, FormulaOutcome, MemoryDocument, MemoryHost};
use mdmath_babel::error::{Error, HostError};
use mdmath_babel::{ComrakRenderer, DocumentBridge, NormalizedFormula, PlaceholderStrategy};

fn bridge(strategy: PlaceholderStrategy) -> DocumentBridge {
    DocumentBridge::new(Box::new(ComrakRenderer::default())).with_strategy(strategy)
}

#[test]
fn inline_formula_becomes_math_object() {
    let mut host = MemoryHost::new();
    let outcome = bridge(PlaceholderStrategy::Html)
        .insert(&mut host, "Area is $x^2$ here.")
        .unwrap();

    assert!(outcome.report.is_complete());
    assert_eq!(outcome.report.inserted(), vec![0]);
    assert_eq!(host.document().math_sources(), vec!["x^2"]);
    let text = host.document().render_text();
    assert!(text.contains("Area is ⟨x^2⟩ here."), "{text}");
    assert!(!text.contains("{formula"));
}

#[test]
fn pasted_html_carries_placeholders_not_latex() {
    let mut host = MemoryHost::new();
    bridge(PlaceholderStrategy::Html)
        .insert(&mut host, "Let $a$ and $$b$$.")
        .unwrap();

    let pasted = &host.pasted()[0];
    assert!(pasted.contains("{formula0}"));
    assert!(pasted.contains("{formula1}"));
    assert!(!pasted.contains("$a$"));
}

#[test]
fn duplicate_formulas_resolve_independently() {
    for strategy in [PlaceholderStrategy::Html, PlaceholderStrategy::Source] {
        let mut host = MemoryHost::new();
        let outcome = bridge(strategy).insert(&mut host, "$x$ plus $x$").unwrap();

        assert_eq!(outcome.report.inserted(), vec![0, 1]);
        assert_eq!(host.document().math_sources(), vec!["x", "x"]);
        assert_eq!(host.document().render_text().trim_end(), "⟨x⟩ plus ⟨x⟩");
    }
}

#[test]
fn source_without_formulas_is_plain_paste() {
    let mut host = MemoryHost::new();
    let outcome = bridge(PlaceholderStrategy::Html)
        .insert(&mut host, "Just *words*.")
        .unwrap();

    assert!(outcome.report.outcomes.is_empty());
    assert!(outcome.missed.is_empty());
    assert!(host.document().math_sources().is_empty());
    assert_eq!(host.document().render_text().trim_end(), "Just words.");
}

#[test]
fn entity_encoded_formulas_are_decoded_for_the_math_object() {
    let mut host = MemoryHost::new();
    bridge(PlaceholderStrategy::Html)
        .insert(&mut host, "Order: $a < b$")
        .unwrap();

    assert_eq!(host.document().math_sources(), vec!["a < b"]);
}

#[test]
fn multi_line_block_formula_is_single_line_latex() {
    let mut host = MemoryHost::new();
    bridge(PlaceholderStrategy::Source)
        .insert(&mut host, "$$\nx = 1 \\\\\ny = 2\n$$\n")
        .unwrap();

    assert_eq!(host.document().math_sources(), vec!["x = 1 y = 2"]);
}

#[test]
fn rejected_paste_never_resolves() {
    let mut host = MemoryHost::rejecting_paste("document is read-only");
    let err = bridge(PlaceholderStrategy::Html)
        .insert(&mut host, "$x$")
        .unwrap_err();

    assert!(matches!(err, Error::Host(HostError::Paste(_))));
    assert!(host.pasted().is_empty());
    assert!(host.document().segments().is_empty());
}

#[test]
fn blank_source_is_refused() {
    let mut host = MemoryHost::new();
    let err = bridge(PlaceholderStrategy::Html)
        .insert(&mut host, "   \n")
        .unwrap_err();
    assert!(matches!(err, Error::EmptyPreview));
    assert!(host.pasted().is_empty());
}

#[test]
fn placeholders_missing_from_the_document_are_reported() {
    let mut doc = MemoryDocument::from_text("the host dropped everything");
    let formulas = vec![NormalizedFormula {
        index: 0,
        latex: "x".to_string(),
    }];

    let report = resolve(&mut doc, &formulas);
    assert_eq!(report.outcomes, vec![(0, FormulaOutcome::Missing)]);
    assert!(!report.is_complete());
    assert!(doc.math_sources().is_empty());
}

#[test]
fn selection_seeds_the_source() {
    let mut host = MemoryHost::with_selection("draft $y$");
    let source = bridge(PlaceholderStrategy::Html).load_selection(&mut host).unwrap();
    assert_eq!(source, "draft $y$");
}

#[test]
fn standalone_insert_offers_preview_file() {
    let artifact = bridge(PlaceholderStrategy::Html)
        .insert_standalone("Area $x^2$")
        .unwrap();
    assert_eq!(artifact.file_name, "preview.html");
    let html = String::from_utf8(artifact.bytes).unwrap();
    assert!(html.contains("{formula0}"));
}

#[test]
fn kitchensink_resolves_every_formula() {
    let source = fixture("kitchensink.md");
    let mut host = MemoryHost::new();
    let outcome = bridge(PlaceholderStrategy::Html)
        .insert(&mut host, &source)
        .unwrap();

    assert!(outcome.report.is_complete(), "{:?}", outcome.report);
    assert!(outcome.missed.is_empty());
    let sources = host.document().math_sources();
    assert!(sources.contains(&"\\alpha"));
    assert!(sources.contains(&"a < b"));
    assert!(sources.contains(&"m"));
    assert!(!host.document().render_text().contains("{formula"));
}

#[test]
fn source_strategy_keeps_latex_escapes_intact() {
    let source = "$$ a \\\\ b $$ and $\\{x\\,y\\}$";

    let mut host = MemoryHost::new();
    bridge(PlaceholderStrategy::Source).insert(&mut host, source).unwrap();
    assert_eq!(host.document().math_sources(), vec!["a b", "\\{x\\,y\\}"]);

    // Markdown escapes are applied before the rendered HTML is scanned
    let mut host = MemoryHost::new();
    bridge(PlaceholderStrategy::Html).insert(&mut host, source).unwrap();
    assert_eq!(host.document().math_sources(), vec!["a \\ b", "{x,y}"]);
}
