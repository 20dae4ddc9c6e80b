use crate::common::fixture;
use insta::assert_snapshot;
use mdmath_babel::formula::{extract, normalize};
use mdmath_babel::placeholder::{embed, Placeholder};
use proptest::prelude::*;

fn body() -> impl Strategy<Value = String> {
    "[a-z0-9+=^_ ]{0,12}[a-z0-9]"
}

fn filler() -> impl Strategy<Value = String> {
    "[A-Za-z ,.]{1,10}"
}

proptest! {
    #[test]
    fn extraction_finds_every_formula_in_order(parts in prop::collection::vec((filler(), body()), 0..6)) {
        let mut text = String::new();
        let mut expected = Vec::new();
        for (prose, latex) in &parts {
            text.push_str(prose);
            let raw = format!("${latex}$");
            text.push_str(&raw);
            expected.push(raw);
        }

        let set = extract(&text);
        prop_assert_eq!(set.raws(), expected.iter().map(String::as_str).collect::<Vec<_>>());
        for (i, formula) in set.iter().enumerate() {
            prop_assert_eq!(formula.index, i);
        }
    }

    #[test]
    fn embedding_substitutes_each_index_once(parts in prop::collection::vec((filler(), body()), 1..6)) {
        let text: String = parts
            .iter()
            .map(|(prose, latex)| format!("{prose}${latex}$"))
            .collect();
        let set = extract(&text);
        let embedded = embed(&text, &set);

        prop_assert!(embedded.is_complete());
        prop_assert!(!embedded.text.contains('$'));
        for i in 0..parts.len() {
            let token = Placeholder::for_index(i);
            prop_assert_eq!(embedded.text.matches(token.as_str()).count(), 1);
        }
    }

    #[test]
    fn normalization_is_idempotent(latex in body(), breaks in 0usize..3) {
        let mut raw = String::from("$$\n");
        raw.push_str(&latex);
        for _ in 0..breaks {
            raw.push_str(" \\\\\n");
            raw.push_str(&latex);
        }
        raw.push_str("\n$$");

        let once = normalize(&raw);
        prop_assert!(!once.contains('\n'));
        prop_assert!(!once.contains("  "));
        prop_assert!(!once.contains("\\\\"));
        prop_assert_eq!(once.trim(), once.as_str());
        prop_assert_eq!(normalize(&once), once);
    }
}

#[test]
fn kitchensink_formulas() {
    let set = extract(&fixture("kitchensink.md"));
    let listing: Vec<String> = set
        .iter()
        .map(|f| format!("{}: {}", f.index, normalize(&f.raw)))
        .collect();
    assert_snapshot!(listing.join("\n"), @r"
    0: t
    1: x(t) = x_0 + v t
    2: E = \frac{1}{2} m v^2 + m g h
    3: m
    4: not math
    5: a < b
    6: t
    7: \alpha
    ");
}
