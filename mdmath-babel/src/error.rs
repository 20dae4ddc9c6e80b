//! Error types for conversion operations

use thiserror::Error;

/// Errors raised while turning Markdown into HTML
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// The Markdown renderer rejected its input
    #[error("Error parsing Markdown: {0}")]
    Markdown(String),
    /// HTML could not be parsed or serialized
    #[error("HTML processing failed: {0}")]
    Html(String),
}

/// Errors raised by the host editor or inside its command context
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// The host did not acknowledge the HTML paste
    #[error("Host rejected HTML paste: {0}")]
    Paste(String),
    /// The deferred command failed inside the host
    #[error("Host command failed: {0}")]
    Command(String),
    /// The command payload could not be encoded or decoded
    #[error("Invalid command payload: {0}")]
    Payload(String),
}

/// Errors raised while producing a downloadable document
#[derive(Debug, Error)]
pub enum ExportError {
    /// No exporter registered under that name
    #[error("Exporter '{0}' not found")]
    ExporterNotFound(String),
    /// The exporter threw while building the blob
    #[error("Error generating DOCX: {0}")]
    Generation(String),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Error writing '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while loading author files
#[derive(Debug, Error)]
pub enum IngestError {
    /// Dropped or selected file is neither Markdown nor plain text
    #[error("Unsupported file '{0}' (use a .md or text file)")]
    Unsupported(String),
    #[error("Error reading file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level error for pipeline operations
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    /// Rendering produced nothing to hand to the destination
    #[error("Preview is empty, nothing to insert")]
    EmptyPreview,
}
