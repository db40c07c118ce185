//! Exporter ids, the exporter factory seam, and a type-erased span exporter

use crate::config::ExporterSpec;
use crate::error::ConfigError;
use futures::future::BoxFuture;
use opentelemetry_sdk::error::OTelSdkResult;
use opentelemetry_sdk::trace::{SpanData, SpanExporter};
use opentelemetry_sdk::Resource;
use std::fmt;
use std::time::Duration;

/// Parsed exporter id of the form `<factory>[/<instance>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterId {
    raw: String,
    factory: String,
    instance: Option<String>,
}

impl ExporterId {
    /// Split an id at the first `/`
    pub fn parse(id: &str) -> Self {
        let (factory, instance) = match id.split_once('/') {
            Some((factory, instance)) => (factory, Some(instance.to_string())),
            None => (id, None),
        };
        Self {
            raw: id.to_string(),
            factory: factory.to_string(),
            instance,
        }
    }

    /// Factory type tag, the part before the first `/`
    pub fn factory(&self) -> &str {
        &self.factory
    }

    /// Instance name, if any; never interpreted
    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    /// The id as written in the document
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ExporterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Constructs span exporters for one factory type tag
pub trait ExporterFactory: Send + Sync {
    /// Build an exporter from its untyped settings
    fn create(&self, id: &ExporterId, spec: &ExporterSpec)
        -> Result<BoxedSpanExporter, ConfigError>;
}

impl<F> ExporterFactory for F
where
    F: Fn(&ExporterId, &ExporterSpec) -> Result<BoxedSpanExporter, ConfigError> + Send + Sync,
{
    fn create(
        &self,
        id: &ExporterId,
        spec: &ExporterSpec,
    ) -> Result<BoxedSpanExporter, ConfigError> {
        self(id, spec)
    }
}

/// Object-safe mirror of [`SpanExporter`]
trait DynSpanExporter: Send + Sync + fmt::Debug {
    fn export_boxed(&self, batch: Vec<SpanData>) -> BoxFuture<'_, OTelSdkResult>;
    fn shutdown_boxed(&mut self, timeout: Duration) -> OTelSdkResult;
    fn force_flush_boxed(&mut self) -> OTelSdkResult;
    fn set_resource_boxed(&mut self, resource: &Resource);
}

impl<E> DynSpanExporter for E
where
    E: SpanExporter + 'static,
{
    fn export_boxed(&self, batch: Vec<SpanData>) -> BoxFuture<'_, OTelSdkResult> {
        Box::pin(SpanExporter::export(self, batch))
    }

    fn shutdown_boxed(&mut self, timeout: Duration) -> OTelSdkResult {
        SpanExporter::shutdown_with_timeout(self, timeout)
    }

    fn force_flush_boxed(&mut self) -> OTelSdkResult {
        SpanExporter::force_flush(self)
    }

    fn set_resource_boxed(&mut self, resource: &Resource) {
        SpanExporter::set_resource(self, resource)
    }
}

/// A span exporter of any concrete type
///
/// Lets factories return different exporter types while processors stay
/// generic over a single one.
#[derive(Debug)]
pub struct BoxedSpanExporter(Box<dyn DynSpanExporter>);

impl BoxedSpanExporter {
    /// Erase the concrete type of an exporter
    pub fn new<E>(exporter: E) -> Self
    where
        E: SpanExporter + 'static,
    {
        Self(Box::new(exporter))
    }
}

impl SpanExporter for BoxedSpanExporter {
    fn export(
        &self,
        batch: Vec<SpanData>,
    ) -> impl std::future::Future<Output = OTelSdkResult> + Send {
        self.0.export_boxed(batch)
    }

    fn shutdown_with_timeout(&mut self, timeout: Duration) -> OTelSdkResult {
        self.0.shutdown_boxed(timeout)
    }

    fn force_flush(&mut self) -> OTelSdkResult {
        self.0.force_flush_boxed()
    }

    fn set_resource(&mut self, resource: &Resource) {
        self.0.set_resource_boxed(resource)
    }
}
