//! Shared configuration loader for the mdmath toolchain.
//!
//! `defaults/mdmath.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`MdmathConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use mdmath_babel::placeholder::PlaceholderStrategy;
use mdmath_babel::publish::PublishOptions;
use mdmath_babel::render::RenderOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TOML: &str = include_str!("../defaults/mdmath.default.toml");

/// Name of the optional per-project configuration file
pub const PROJECT_CONFIG_FILE: &str = "mdmath.toml";

/// Top-level configuration consumed by mdmath applications.
#[derive(Debug, Clone, Deserialize)]
pub struct MdmathConfig {
    pub render: RenderConfig,
    pub preview: PreviewConfig,
    pub placeholder: PlaceholderConfig,
    pub export: ExportConfig,
}

/// Mirrors the knobs exposed by the Markdown renderer.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub allow_html: bool,
    pub autolink: bool,
    pub tables: bool,
    pub strikethrough: bool,
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        RenderOptions {
            allow_html: config.allow_html,
            autolink: config.autolink,
            tables: config.tables,
            strikethrough: config.strikethrough,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewConfig {
    pub debounce_ms: u64,
    pub typeset_math: bool,
}

impl PreviewConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceholderConfig {
    pub strategy: PlaceholderStrategy,
}

/// Export-to-file knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub exporter: String,
    pub body_font: String,
    pub docx_file_name: String,
    pub html_file_name: String,
    pub preview_file_name: String,
    /// Empty means no extra stylesheet
    pub custom_css: String,
}

impl ExportConfig {
    pub fn custom_css_path(&self) -> Option<PathBuf> {
        let trimmed = self.custom_css.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }
}

impl MdmathConfig {
    /// Publish options for this configuration; `custom_css` is the already-read
    /// stylesheet named by `export.custom_css`, if any.
    pub fn publish_options(&self, custom_css: Option<String>) -> PublishOptions {
        PublishOptions {
            exporter: self.export.exporter.clone(),
            body_font: self.export.body_font.clone(),
            docx_file_name: self.export.docx_file_name.clone(),
            html_file_name: self.export.html_file_name.clone(),
            custom_css,
            typeset_math: self.preview.typeset_math,
            render: RenderOptions::from(&self.render),
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<MdmathConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<MdmathConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert!(config.render.allow_html);
        assert_eq!(config.preview.debounce(), Duration::from_millis(150));
        assert_eq!(config.placeholder.strategy, PlaceholderStrategy::Html);
        assert_eq!(config.export.exporter, "altchunk");
        assert_eq!(config.export.docx_file_name, "document-from-md.docx");
        assert_eq!(config.export.preview_file_name, "preview.html");
        assert_eq!(config.export.custom_css_path(), None);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("placeholder.strategy", "source")
            .expect("override to apply")
            .set_override("preview.debounce_ms", 400_i64)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.placeholder.strategy, PlaceholderStrategy::Source);
        assert_eq!(config.preview.debounce_ms, 400);
    }

    #[test]
    fn rejects_unknown_strategy() {
        let result = Loader::new()
            .set_override("placeholder.strategy", "tokens")
            .expect("override to apply")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn layers_files_over_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[export]\nexporter = \"pandoc\"\ncustom_css = \"theme.css\"\n").unwrap();

        let config = Loader::new().with_file(&path).build().expect("config to build");
        assert_eq!(config.export.exporter, "pandoc");
        assert_eq!(config.export.custom_css_path(), Some(PathBuf::from("theme.css")));
        assert_eq!(config.export.body_font, "Arial,Helvetica,sans-serif");
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/definitely/not/here/mdmath.toml")
            .build()
            .expect("config to build");
        assert_eq!(config.export.exporter, "altchunk");
    }

    #[test]
    fn render_config_converts_to_render_options() {
        let config = load_defaults().expect("defaults to deserialize");
        let options = RenderOptions::from(&config.render);
        assert_eq!(options, RenderOptions::default());

        let publish = config.publish_options(Some("p { color: red }".to_string()));
        assert_eq!(publish.exporter, "altchunk");
        assert!(publish.typeset_math);
        assert_eq!(publish.custom_css.as_deref(), Some("p { color: red }"));
    }
}
