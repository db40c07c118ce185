//! Type-keyed registry of exporter and processor factories

use crate::config::ExporterSpec;
use crate::error::ConfigError;
use crate::pipeline::exporter::{BoxedSpanExporter, ExporterFactory, ExporterId};
use crate::pipeline::otlp::OtlpExporterFactory;
use crate::pipeline::processor::{BatchProcessorFactory, ProcessorFactory};
use std::collections::HashMap;
use std::sync::Arc;

/// Exporter type tag registered by default
pub const OTLP_EXPORTER: &str = "otlp";

/// Processor type tag registered by default
pub const BATCH_PROCESSOR: &str = "batch";

/// Factories used to turn configuration into exporters and processors
///
/// [`Registry::default`] knows `otlp` exporters and `batch` processors. More
/// kinds can be registered without touching the wiring code.
#[derive(Clone)]
pub struct Registry {
    exporters: HashMap<String, Arc<dyn ExporterFactory>>,
    processors: HashMap<String, Arc<dyn ProcessorFactory>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::empty()
            .with_exporter(OTLP_EXPORTER, OtlpExporterFactory)
            .with_processor(BATCH_PROCESSOR, BatchProcessorFactory)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut exporters: Vec<_> = self.exporters.keys().collect();
        let mut processors: Vec<_> = self.processors.keys().collect();
        exporters.sort();
        processors.sort();
        f.debug_struct("Registry")
            .field("exporters", &exporters)
            .field("processors", &processors)
            .finish()
    }
}

impl Registry {
    /// A registry with no factories at all
    pub fn empty() -> Self {
        Self {
            exporters: HashMap::new(),
            processors: HashMap::new(),
        }
    }

    /// Register an exporter factory, replacing any previous one for `tag`
    pub fn register_exporter<F>(&mut self, tag: impl Into<String>, factory: F)
    where
        F: ExporterFactory + 'static,
    {
        self.exporters.insert(tag.into(), Arc::new(factory));
    }

    /// Register a processor factory, replacing any previous one for `tag`
    pub fn register_processor<F>(&mut self, tag: impl Into<String>, factory: F)
    where
        F: ProcessorFactory + 'static,
    {
        self.processors.insert(tag.into(), Arc::new(factory));
    }

    /// Builder-style [`Registry::register_exporter`]
    pub fn with_exporter<F>(mut self, tag: impl Into<String>, factory: F) -> Self
    where
        F: ExporterFactory + 'static,
    {
        self.register_exporter(tag, factory);
        self
    }

    /// Builder-style [`Registry::register_processor`]
    pub fn with_processor<F>(mut self, tag: impl Into<String>, factory: F) -> Self
    where
        F: ProcessorFactory + 'static,
    {
        self.register_processor(tag, factory);
        self
    }

    /// Look up the processor factory for a processor type
    pub fn processor(&self, kind: &str) -> Option<&dyn ProcessorFactory> {
        self.processors.get(kind).map(|factory| factory.as_ref())
    }

    /// Build an exporter, dispatching on the id's prefix before the first `/`
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedExporter` naming the id if no factory is registered
    /// for its prefix, or whatever the factory itself returns.
    pub fn create_exporter(
        &self,
        id: &str,
        spec: &ExporterSpec,
    ) -> Result<BoxedSpanExporter, ConfigError> {
        let id = ExporterId::parse(id);
        let factory = self
            .exporters
            .get(id.factory())
            .ok_or_else(|| ConfigError::UnsupportedExporter(id.to_string()))?;
        factory.create(&id, spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_knows_otlp_and_batch() {
        let registry = Registry::default();
        assert!(registry.processor(BATCH_PROCESSOR).is_some());
        assert!(registry.processor("simple").is_none());
        assert!(format!("{:?}", registry).contains("otlp"));
    }

    #[test]
    fn test_unknown_exporter_names_the_id() {
        let registry = Registry::default();
        let err = registry
            .create_exporter("console", &ExporterSpec::new())
            .unwrap_err();

        assert!(matches!(err, ConfigError::UnsupportedExporter(_)));
        assert!(err.to_string().contains("console"));
    }

    #[test]
    fn test_empty_registry_rejects_otlp() {
        let registry = Registry::empty();
        let result = registry.create_exporter("otlp/exporter1", &ExporterSpec::new());
        assert!(matches!(result, Err(ConfigError::UnsupportedExporter(_))));
    }

    #[test]
    fn test_registered_closure_is_dispatched_by_prefix() {
        let registry = Registry::empty().with_exporter(
            "memory",
            |id: &ExporterId, _spec: &ExporterSpec| -> Result<BoxedSpanExporter, ConfigError> {
                assert_eq!(id.instance(), Some("one"));
                Ok(BoxedSpanExporter::new(
                    opentelemetry_sdk::trace::InMemorySpanExporter::default(),
                ))
            },
        );

        assert!(registry
            .create_exporter("memory/one", &ExporterSpec::new())
            .is_ok());
    }
}
