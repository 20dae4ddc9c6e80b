//! HTML to document exporters
//!
//! An exporter turns a complete, style-inlined HTML document into the bytes of a
//! downloadable file. Exporters report whether they can run at all through
//! [`Exporter::is_available`]; publishing falls back to plain HTML when the chosen one
//! cannot.

pub mod altchunk;
#[cfg(feature = "native-export")]
pub mod pandoc;
pub mod registry;

pub use altchunk::AltChunkExporter;
#[cfg(feature = "native-export")]
pub use pandoc::PandocExporter;
pub use registry::ExporterRegistry;

use crate::error::ExportError;

pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub trait Exporter: Send + Sync {
    /// Registry name, e.g. `altchunk`
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Extension of produced files, without the dot
    fn file_extension(&self) -> &str {
        "docx"
    }

    fn media_type(&self) -> &str {
        DOCX_MEDIA_TYPE
    }

    /// Capability check; an unavailable exporter is skipped, not an error
    fn is_available(&self) -> bool {
        true
    }

    /// Convert a complete HTML document to file bytes
    fn export(&self, html: &str) -> Result<Vec<u8>, ExportError>;
}
