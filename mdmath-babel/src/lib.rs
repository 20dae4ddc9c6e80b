//! Formula-preserving Markdown conversion
//!
//!     This crate turns author Markdown with embedded LaTeX into HTML for a host document editor
//!     or a downloadable document, while keeping every formula an editable, native math object
//!     on the destination side instead of flattened text or an image.
//!
//!     TLDR:
//!         - Markdown rendering is never done here, comrak does it. Math typesetting for the
//!           preview is done by latex2mathml. Documents are produced by exporters.
//!         - Formulas are extracted exactly once per conversion, into an immutable FormulaSet.
//!         - Placeholders ({formula<i>}) cross the boundary in place of LaTeX; the destination
//!           swaps them back for math objects built from the normalized formulas.
//!         - Normalization runs only after embedding has consumed the raw formula text.
//!
//! Architecture
//!
//!     source ──▶ render ──▶ extract ──▶ embed ──▶ normalize ──▶ bridge (paste + resolve)
//!                   │
//!                   └──▶ typeset ──▶ inline styles ──▶ export ──▶ publish (docx or html)
//!
//!     The host editor is only known through two traits (see ./bridge/mod.rs): the outer
//!     HostEditor, which pastes HTML and runs commands, and the DocumentApi available inside the
//!     host's isolated command context. Data crosses into that context as a serialized payload,
//!     and a report comes back out.
//!
//!     This is a pure lib: it powers mdmath-cli but is shell agnostic, no code here prints or
//!     reads env vars (with the one exception of the pandoc binary override, like every tool
//!     that shells out).
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── formula                 # extraction and normalization, FormulaSet
//!     ├── placeholder.rs          # tokens, embedding, strategies
//!     ├── render                  # MarkupRenderer, typesetting, preview, debounce
//!     ├── html                    # DOM helpers, css rules, style inlining
//!     ├── bridge                  # host traits, resolve, DocumentBridge, in-memory host
//!     ├── export                  # Exporter trait, altchunk and pandoc, registry
//!     ├── publish.rs              # export-to-file pipeline with HTML fallback
//!     └── ingest.rs               # loading dropped or opened files
//!
//! Testing
//!     tests
//!     ├── lib.rs                  # aggregates the modules below
//!     ├── <area>.rs
//!     └── fixtures
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.
//!
//! Library Choices
//!
//!     comrak for Markdown (CommonMark plus the GFM extensions authors expect), html5ever and
//!     markup5ever_rcdom for HTML, latex2mathml for preview math, zip for the docx package.
//!     Stylesheets are read with lightningcss and selectors are matched by scraper, so style
//!     inlining sees the same selector semantics a browser does.
//!     Converting to docx with native paragraphs is delegated to pandoc when it is installed; we
//!     never write a WordprocessingML generator.

pub mod bridge;
pub mod error;
pub mod export;
pub mod formula;
pub mod html;
pub mod ingest;
pub mod placeholder;
pub mod publish;
pub mod render;

pub use bridge::{DocumentApi, DocumentBridge, HostEditor, MemoryHost, ResolveReport};
pub use error::{Error, ExportError, HostError, IngestError, RenderError};
pub use export::{Exporter, ExporterRegistry};
pub use formula::{extract, normalize, Formula, FormulaSet, NormalizedFormula};
pub use placeholder::{Placeholder, PlaceholderStrategy};
pub use publish::{publish, PublishArtifact, PublishResult, PublishSpec};
pub use render::{ComrakRenderer, MarkupRenderer, Preview, RenderOptions};
