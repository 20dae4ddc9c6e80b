//! Loading author files
//!
//! Accepts Markdown and plain-text files only. Bytes are decoded as UTF-8, with invalid
//! sequences replaced rather than rejected.

use crate::error::IngestError;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd"];
pub const TEXT_EXTENSIONS: &[&str] = &["txt", "text"];

/// Whether a file of this name would be accepted
pub fn is_supported(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        None => true,
        Some(ext) => {
            let ext = ext.to_ascii_lowercase();
            MARKDOWN_EXTENSIONS.contains(&ext.as_str()) || TEXT_EXTENSIONS.contains(&ext.as_str())
        }
    }
}

/// Read a Markdown or text file as the new source text
pub fn load_source(path: &Path) -> Result<String, IngestError> {
    if !is_supported(path) {
        return Err(IngestError::Unsupported(path.display().to_string()));
    }
    let bytes = fs::read(path).map_err(|source| IngestError::Read {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "source loaded");
    Ok(decode(&bytes))
}

/// Decode dropped bytes as UTF-8, replacing invalid sequences
pub fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
