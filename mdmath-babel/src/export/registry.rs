//! Exporter registry
//!
//! Exporters are registered and retrieved by name; publishing looks the configured one
//! up here.

use super::Exporter;
use crate::error::ExportError;
use std::collections::HashMap;

pub struct ExporterRegistry {
    exporters: HashMap<String, Box<dyn Exporter>>,
}

impl ExporterRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        ExporterRegistry {
            exporters: HashMap::new(),
        }
    }

    /// Register an exporter, replacing any with the same name
    pub fn register<E: Exporter + 'static>(&mut self, exporter: E) {
        self.exporters
            .insert(exporter.name().to_string(), Box::new(exporter));
    }

    pub fn get(&self, name: &str) -> Result<&dyn Exporter, ExportError> {
        self.exporters
            .get(name)
            .map(|e| e.as_ref())
            .ok_or_else(|| ExportError::ExporterNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.exporters.contains_key(name)
    }

    /// Registered names, sorted
    pub fn list_exporters(&self) -> Vec<String> {
        let mut names: Vec<_> = self.exporters.keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of exporters whose capability check passes right now
    pub fn available(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .exporters
            .values()
            .filter(|e| e.is_available())
            .map(|e| e.name().to_string())
            .collect();
        names.sort();
        names
    }

    /// Create a registry with the built-in exporters
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(super::AltChunkExporter);
        #[cfg(feature = "native-export")]
        registry.register(super::PandocExporter::default());
        registry
    }
}

impl Default for ExporterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
