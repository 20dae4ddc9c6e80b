//! Hand-off of converted documents to a host editor
//!
//!     The host sees LaTeX only as placeholder text. Insertion is two steps against the
//!     host:
//!
//!         1. paste the placeholder HTML ([`HostEditor::paste_html`])
//!         2. once the paste is acknowledged, run the resolve command in the host's isolated
//!            command context ([`HostEditor::run_command`])
//!
//!     The command context shares nothing with the caller. It receives a [`CommandPayload`]
//!     holding the serialized normalized formulas and answers with a [`ResolveReport`].
//!     Inside the context, [`resolve`] drives the host's [`DocumentApi`].
//!
//!     A formula whose placeholder cannot be found is skipped and reported as missing; it is
//!     never retried and never turns into an error.

pub mod memory;

pub use memory::{MemoryDocument, MemoryHost, Segment};

use crate::error::{Error, HostError, RenderError};
use crate::formula::{extract, extract_from_html, FormulaSet, NormalizedFormula};
use crate::html::wrap_document;
use crate::placeholder::{embed, PlaceholderStrategy};
use crate::publish::Artifact;
use crate::render::MarkupRenderer;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// File offered by the standalone path when no host is attached
pub const STANDALONE_FILE_NAME: &str = "preview.html";

/// Positive acknowledgement that the host finished a paste
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteAck {
    /// Bytes of HTML the host accepted
    pub bytes: usize,
}

/// A span of document text returned by a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    /// Host-specific container (paragraph, run, segment)
    pub container: usize,
    pub start: usize,
    pub end: usize,
}

/// Input syntax of a native math object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MathSyntax {
    Latex,
}

/// The host editor as seen from outside its command context
pub trait HostEditor {
    /// Paste HTML at the current position, returning once the host has applied it
    fn paste_html(&mut self, html: &str) -> Result<PasteAck, HostError>;

    /// Text currently selected in the host document
    fn selected_text(&mut self) -> Result<String, HostError>;

    /// Run the resolve command in the host's isolated context
    fn run_command(&mut self, payload: CommandPayload) -> Result<ResolveReport, HostError>;
}

/// The document API available inside the host's command context
pub trait DocumentApi {
    /// All ranges whose text equals `pattern`, in document order
    fn search(&mut self, pattern: &str) -> Vec<TextRange>;

    fn select(&mut self, range: &TextRange) -> Result<(), HostError>;

    fn delete(&mut self, range: &TextRange) -> Result<(), HostError>;

    /// Insert a native math object at the current position
    fn insert_math(&mut self, source: &str, syntax: MathSyntax) -> Result<(), HostError>;
}

/// Everything the isolated command context gets to see
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPayload(String);

impl CommandPayload {
    pub fn encode(formulas: &[NormalizedFormula]) -> Result<Self, HostError> {
        serde_json::to_string(formulas)
            .map(CommandPayload)
            .map_err(|e| HostError::Payload(e.to_string()))
    }

    pub fn decode(&self) -> Result<Vec<NormalizedFormula>, HostError> {
        serde_json::from_str(&self.0).map_err(|e| HostError::Payload(e.to_string()))
    }

    /// Wrap JSON received from elsewhere
    pub fn from_json(json: impl Into<String>) -> Self {
        CommandPayload(json.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum FormulaOutcome {
    /// Placeholder replaced by a math object
    Inserted,
    /// No placeholder found; skipped
    Missing,
    /// The document API failed for this formula
    Failed(String),
}

/// Result of one resolve run, per formula index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveReport {
    pub outcomes: Vec<(usize, FormulaOutcome)>,
}

impl ResolveReport {
    fn indices_with(&self, wanted: impl Fn(&FormulaOutcome) -> bool) -> Vec<usize> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| wanted(outcome))
            .map(|(index, _)| *index)
            .collect()
    }

    pub fn inserted(&self) -> Vec<usize> {
        self.indices_with(|o| *o == FormulaOutcome::Inserted)
    }

    pub fn missing(&self) -> Vec<usize> {
        self.indices_with(|o| *o == FormulaOutcome::Missing)
    }

    pub fn failed(&self) -> Vec<usize> {
        self.indices_with(|o| matches!(o, FormulaOutcome::Failed(_)))
    }

    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|(_, o)| *o == FormulaOutcome::Inserted)
    }
}

/// Replace each formula's placeholder in `doc` with a native math object
///
/// For every formula in order: search its placeholder, then select, delete and replace
/// the first match. Zero matches records `Missing` and moves on.
pub fn resolve<D: DocumentApi + ?Sized>(doc: &mut D, formulas: &[NormalizedFormula]) -> ResolveReport {
    let mut report = ResolveReport::default();
    for formula in formulas {
        let placeholder = formula.placeholder();
        let matches = doc.search(placeholder.as_str());
        let outcome = match matches.first() {
            None => {
                debug!(index = formula.index, "placeholder not found; skipped");
                FormulaOutcome::Missing
            }
            Some(range) => match replace_with_math(doc, range, &formula.latex) {
                Ok(()) => FormulaOutcome::Inserted,
                Err(e) => {
                    debug!(index = formula.index, error = %e, "math insertion failed");
                    FormulaOutcome::Failed(e.to_string())
                }
            },
        };
        report.outcomes.push((formula.index, outcome));
    }
    report
}

fn replace_with_math<D: DocumentApi + ?Sized>(doc: &mut D, range: &TextRange, latex: &str) -> Result<(), HostError> {
    doc.select(range)?;
    doc.delete(range)?;
    doc.insert_math(latex, MathSyntax::Latex)
}

/// Placeholder HTML plus everything needed to resolve it later
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedInsert {
    /// Complete HTML document carrying placeholders
    pub html: String,
    pub formulas: FormulaSet,
    pub normalized: Vec<NormalizedFormula>,
    pub embedded: Vec<usize>,
    pub missed: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOutcome {
    pub ack: PasteAck,
    pub report: ResolveReport,
    /// Indices whose formula text was not found when embedding
    pub missed: Vec<usize>,
}

pub struct DocumentBridge {
    renderer: Box<dyn MarkupRenderer>,
    strategy: PlaceholderStrategy,
}

impl DocumentBridge {
    pub fn new(renderer: Box<dyn MarkupRenderer>) -> Self {
        Self {
            renderer,
            strategy: PlaceholderStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: PlaceholderStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> PlaceholderStrategy {
        self.strategy
    }

    /// Render `source` and substitute placeholders, extracting formulas exactly once
    pub fn prepare(&self, source: &str) -> Result<PreparedInsert, Error> {
        let (body, formulas, embedded) = match self.strategy {
            PlaceholderStrategy::Html => {
                let rendered = self.render(source)?;
                let formulas = extract_from_html(&rendered);
                warn_on_collision(&formulas, &rendered);
                let embedded = embed(&rendered, &formulas);
                (embedded.text.clone(), formulas, embedded)
            }
            PlaceholderStrategy::Source => {
                let formulas = extract(source);
                warn_on_collision(&formulas, source);
                let embedded = embed(source, &formulas);
                let rendered = self.render(&embedded.text)?;
                (rendered, formulas, embedded)
            }
        };

        if body.trim().is_empty() {
            return Err(Error::EmptyPreview);
        }

        let normalized = formulas.normalized();
        debug!(
            formulas = formulas.len(),
            embedded = embedded.embedded.len(),
            missed = embedded.missed.len(),
            "placeholders embedded"
        );
        Ok(PreparedInsert {
            html: wrap_document(&body, ""),
            formulas,
            normalized,
            embedded: embedded.embedded,
            missed: embedded.missed,
        })
    }

    /// Paste `source` into the host, then swap placeholders for math objects
    ///
    /// The resolve command is only issued after the host acknowledges the paste; a
    /// rejected paste aborts before anything else touches the document.
    pub fn insert<H: HostEditor + ?Sized>(&self, host: &mut H, source: &str) -> Result<InsertOutcome, Error> {
        let prepared = self.prepare(source)?;
        let ack = host.paste_html(&prepared.html)?;
        info!(bytes = ack.bytes, "HTML inserted into document");

        let report = if prepared.normalized.is_empty() {
            ResolveReport::default()
        } else {
            let payload = CommandPayload::encode(&prepared.normalized)?;
            host.run_command(payload)?
        };
        if !report.is_complete() {
            debug!(missing = ?report.missing(), failed = ?report.failed(), "some formulas were not resolved");
        }

        Ok(InsertOutcome {
            ack,
            report,
            missed: prepared.missed,
        })
    }

    /// With no host attached, offer the placeholder HTML as `preview.html`
    pub fn insert_standalone(&self, source: &str) -> Result<Artifact, Error> {
        let prepared = self.prepare(source)?;
        Ok(Artifact::html(STANDALONE_FILE_NAME, prepared.html))
    }

    /// The host's current selection, used as the initial source text
    pub fn load_selection<H: HostEditor + ?Sized>(&self, host: &mut H) -> Result<String, HostError> {
        host.selected_text()
    }

    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        self.renderer.render(markdown)
    }
}

fn warn_on_collision(formulas: &FormulaSet, text: &str) {
    if formulas.collides_with(text) {
        warn!("text already contains a placeholder-shaped token; insertion may be ambiguous");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ComrakRenderer;

    fn bridge() -> DocumentBridge {
        DocumentBridge::new(Box::new(ComrakRenderer::default()))
    }

    fn formula(index: usize, latex: &str) -> NormalizedFormula {
        NormalizedFormula {
            index,
            latex: latex.to_string(),
        }
    }

    #[test]
    fn payload_carries_formulas_by_value() {
        let formulas = vec![formula(0, "x^2"), formula(1, "a<b")];
        let payload = CommandPayload::encode(&formulas).unwrap();
        assert_eq!(
            payload.as_str(),
            r#"[{"index":0,"latex":"x^2"},{"index":1,"latex":"a<b"}]"#
        );
        assert_eq!(payload.decode().unwrap(), formulas);
    }

    #[test]
    fn malformed_payload_is_a_payload_error() {
        let err = CommandPayload::from_json("{not json").decode().unwrap_err();
        assert!(matches!(err, HostError::Payload(_)));
    }

    #[test]
    fn report_serializes_for_the_way_back() {
        let report = ResolveReport {
            outcomes: vec![(0, FormulaOutcome::Inserted), (1, FormulaOutcome::Missing)],
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"outcomes":[[0,{"status":"inserted"}],[1,{"status":"missing"}]]}"#
        );
        assert_eq!(report.inserted(), vec![0]);
        assert_eq!(report.missing(), vec![1]);
        assert!(!report.is_complete());
    }

    #[test]
    fn prepare_html_strategy_embeds_into_rendered_html() {
        let prepared = bridge().prepare("Area $x^2$ and $$y$$").unwrap();
        assert!(prepared.html.contains("<p>Area {formula0} and {formula1}</p>"));
        assert!(prepared.html.starts_with("<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body>"));
        assert_eq!(prepared.normalized, vec![formula(0, "x^2"), formula(1, "y")]);
        assert!(prepared.missed.is_empty());
    }

    #[test]
    fn prepare_source_strategy_renders_placeholders() {
        let prepared = bridge()
            .with_strategy(PlaceholderStrategy::Source)
            .prepare("Sum $a_1 + b_1$ and $c*d*e$")
            .unwrap();
        assert!(prepared.html.contains("<p>Sum {formula0} and {formula1}</p>"));
        assert_eq!(prepared.normalized[1].latex, "c*d*e");
    }

    #[test]
    fn html_formulas_are_entity_decoded() {
        let prepared = bridge().prepare("Compare $a < b$").unwrap();
        assert_eq!(prepared.normalized, vec![formula(0, "a < b")]);
    }

    #[test]
    fn empty_source_is_rejected() {
        let err = bridge().prepare("   \n").unwrap_err();
        assert!(matches!(err, Error::EmptyPreview));
    }

    /// A document that refuses to insert one particular formula
    struct RefusingDocument {
        inner: MemoryDocument,
        refuse: &'static str,
    }

    impl DocumentApi for RefusingDocument {
        fn search(&mut self, pattern: &str) -> Vec<TextRange> {
            self.inner.search(pattern)
        }

        fn select(&mut self, range: &TextRange) -> Result<(), HostError> {
            self.inner.select(range)
        }

        fn delete(&mut self, range: &TextRange) -> Result<(), HostError> {
            self.inner.delete(range)
        }

        fn insert_math(&mut self, source: &str, syntax: MathSyntax) -> Result<(), HostError> {
            if source == self.refuse {
                return Err(HostError::Command("equation region is read-only".to_string()));
            }
            self.inner.insert_math(source, syntax)
        }
    }

    #[test]
    fn host_failure_is_recorded_and_resolution_continues() {
        let mut doc = RefusingDocument {
            inner: MemoryDocument::from_text("a {formula0} b {formula1}"),
            refuse: "bad",
        };
        let report = resolve(&mut doc, &[formula(0, "bad"), formula(1, "y")]);

        assert!(matches!(
            &report.outcomes[0],
            (0, FormulaOutcome::Failed(reason)) if reason.contains("read-only")
        ));
        assert_eq!(report.outcomes[1], (1, FormulaOutcome::Inserted));
        assert_eq!(report.failed(), vec![0]);
        assert!(!report.is_complete());

        assert_eq!(doc.inner.math_sources(), vec!["y"]);
        assert_eq!(doc.inner.render_text(), "a  b ⟨y⟩");
    }

    #[test]
    fn standalone_offers_preview_html() {
        let artifact = bridge().insert_standalone("Hello $x$").unwrap();
        assert_eq!(artifact.file_name, "preview.html");
        let text = String::from_utf8(artifact.bytes).unwrap();
        assert!(text.contains("Hello {formula0}"));
    }
}
