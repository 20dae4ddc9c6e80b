//! DOCX export by shelling out to pandoc.
//!
//! The HTML is written to a temporary directory and converted with
//! `pandoc -f html -t docx`. pandoc maps MathML and TeX math to native equations, so this
//! exporter produces real Word paragraphs rather than an imported chunk.

use super::Exporter;
use crate::error::ExportError;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;
use tracing::debug;
use which::which;

/// Environment variable overriding pandoc discovery
pub const PANDOC_BIN_ENV: &str = "MDMATH_PANDOC_BIN";

#[derive(Debug, Clone, Default)]
pub struct PandocExporter {
    binary: Option<PathBuf>,
}

impl PandocExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `binary` instead of searching for pandoc
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: Some(binary.into()),
        }
    }

    fn resolve_binary(&self) -> Option<PathBuf> {
        if let Some(binary) = &self.binary {
            return Some(binary.clone());
        }
        if let Some(path) = env::var_os(PANDOC_BIN_ENV) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        which("pandoc").ok()
    }
}

impl Exporter for PandocExporter {
    fn name(&self) -> &str {
        "pandoc"
    }

    fn description(&self) -> &str {
        "DOCX with native equations via the pandoc binary"
    }

    fn is_available(&self) -> bool {
        self.resolve_binary().is_some()
    }

    fn export(&self, html: &str) -> Result<Vec<u8>, ExportError> {
        let pandoc = self.resolve_binary().ok_or_else(|| {
            ExportError::Generation(format!(
                "Unable to locate pandoc. Set {PANDOC_BIN_ENV} to override the detection."
            ))
        })?;

        let temp_dir = tempdir().map_err(|e| ExportError::Generation(format!("Temp dir error: {e}")))?;
        let html_path = temp_dir.path().join("mdmath-export.html");
        let docx_path = temp_dir.path().join("mdmath-export.docx");
        fs::write(&html_path, html).map_err(|e| ExportError::Generation(e.to_string()))?;

        debug!(pandoc = %pandoc.display(), "running pandoc");
        let output = Command::new(&pandoc)
            .arg("-f")
            .arg("html")
            .arg("-t")
            .arg("docx")
            .arg("-o")
            .arg(&docx_path)
            .arg(&html_path)
            .output()
            .map_err(|e| {
                ExportError::Generation(format!("Failed to launch pandoc ({}): {}", pandoc.display(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExportError::Generation(format!(
                "pandoc exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        fs::read(&docx_path).map_err(|e| ExportError::Generation(e.to_string()))
    }
}
