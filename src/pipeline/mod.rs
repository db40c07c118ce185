//! Pipeline wiring
//!
//! Turns a validated [`OpenTelemetryConfiguration`] into an installed
//! `SdkTracerProvider`. Wiring runs in fixed phases (see [`PipelineState`]);
//! any error before installation leaves the process-wide tracer provider
//! untouched.

pub mod exporter;
pub mod otlp;
pub mod processor;
pub mod registry;

use crate::config::{OpenTelemetryConfiguration, SpanProcessorConfig, TracerProviderConfig};
use crate::error::ConfigError;
use crate::pipeline::exporter::BoxedSpanExporter;
use crate::pipeline::registry::Registry;
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};
use tracing::{debug, error, info, warn};

pub use exporter::{ExporterFactory, ExporterId};
pub use processor::ProcessorFactory;

/// Stage of a wiring run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Nothing has happened yet
    Unconfigured,
    /// The SDK is disabled; nothing was built (terminal)
    Disabled,
    /// Checking that every processor references a declared exporter
    ValidatingReferences,
    /// Constructing exporters through their factories
    BuildingExporters,
    /// Wrapping exporters in processors
    BuildingProcessors,
    /// The tracer provider is installed globally (terminal)
    Installed,
    /// Wiring failed and nothing was installed (terminal)
    Failed,
}

impl PipelineState {
    fn enter(self) -> Self {
        debug!(state = ?self, "pipeline wiring");
        self
    }
}

/// Owns the installed tracer provider and its teardown
///
/// [`TelemetryGuard::shutdown`] consumes the guard, so teardown runs at most
/// once. A guard dropped without an explicit shutdown shuts the provider down
/// on drop.
#[derive(Debug)]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
    state: PipelineState,
}

impl TelemetryGuard {
    /// A guard that owns nothing, for a disabled SDK
    pub fn disabled() -> Self {
        Self {
            provider: None,
            state: PipelineState::Disabled,
        }
    }

    /// A guard that owns nothing, after a failed wiring run
    pub fn failed() -> Self {
        Self {
            provider: None,
            state: PipelineState::Failed,
        }
    }

    /// Install `provider` as the process-wide tracer provider and guard it
    pub fn install(provider: SdkTracerProvider) -> Self {
        opentelemetry::global::set_tracer_provider(provider.clone());
        Self {
            provider: Some(provider),
            state: PipelineState::Installed.enter(),
        }
    }

    /// Terminal state of the wiring run that produced this guard
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// True when a tracer provider was installed
    pub fn is_installed(&self) -> bool {
        self.provider.is_some()
    }

    /// The installed tracer provider, if any
    pub fn tracer_provider(&self) -> Option<&SdkTracerProvider> {
        self.provider.as_ref()
    }

    /// Export all spans buffered so far
    pub fn force_flush(&self) -> Result<(), ConfigError> {
        match &self.provider {
            Some(provider) => provider
                .force_flush()
                .map_err(|e| ConfigError::ShutdownError(format!("Failed to flush: {}", e))),
            None => Ok(()),
        }
    }

    /// Flush and shut down the tracer provider
    ///
    /// Blocks until buffered spans have been handed to the exporters. Succeeds
    /// trivially when nothing was installed.
    ///
    /// # Errors
    ///
    /// Returns `ShutdownError` if the SDK reports a shutdown failure.
    pub fn shutdown(mut self) -> Result<(), ConfigError> {
        match self.provider.take() {
            Some(provider) => {
                info!("Shutting down tracer provider");
                provider.shutdown().map_err(|e| {
                    ConfigError::ShutdownError(format!(
                        "Failed to shut down tracer provider: {}",
                        e
                    ))
                })
            }
            None => Ok(()),
        }
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                warn!(error = %e, "Failed to shut down tracer provider on drop");
            }
        }
    }
}

/// Configure tracing from a configuration document with the default registry
///
/// Never fails: wiring errors are logged and produce a no-op guard, so the
/// host application starts with tracing disabled.
pub fn configure(config: &OpenTelemetryConfiguration) -> TelemetryGuard {
    configure_with_registry(config, &Registry::default())
}

/// Configure tracing using a custom factory registry
pub fn configure_with_registry(
    config: &OpenTelemetryConfiguration,
    registry: &Registry,
) -> TelemetryGuard {
    PipelineState::Unconfigured.enter();

    if config.sdk.disabled {
        info!("SDK disabled");
        PipelineState::Disabled.enter();
        return TelemetryGuard::disabled();
    }

    match build_tracer_provider(&config.sdk.tracer_provider, registry) {
        Ok(provider) => TelemetryGuard::install(provider),
        Err(e) => {
            error!(error = %e, "error configuring tracer provider");
            PipelineState::Failed.enter();
            TelemetryGuard::failed()
        }
    }
}

/// Build a tracer provider without installing it
///
/// # Errors
///
/// Returns `ExporterNotFound` if a processor references an undeclared
/// exporter, `UnsupportedExporter` if no factory handles an exporter's type,
/// or the factory's own error. Unknown processor types are skipped with a
/// warning.
pub fn build_tracer_provider(
    config: &TracerProviderConfig,
    registry: &Registry,
) -> Result<SdkTracerProvider, ConfigError> {
    PipelineState::ValidatingReferences.enter();
    for processor in &config.span_processors {
        if config.exporter(&processor.args.exporter).is_none() {
            return Err(ConfigError::ExporterNotFound(processor.args.exporter.clone()));
        }
    }

    PipelineState::BuildingExporters.enter();
    let mut wired: Vec<(&SpanProcessorConfig, BoxedSpanExporter)> =
        Vec::with_capacity(config.span_processors.len());
    for processor in &config.span_processors {
        let id = &processor.args.exporter;
        let spec = config
            .exporter(id)
            .ok_or_else(|| ConfigError::ExporterNotFound(id.clone()))?;
        let exporter = registry.create_exporter(id, spec)?;
        debug!(exporter = %id, "exporter built");
        wired.push((processor, exporter));
    }

    PipelineState::BuildingProcessors.enter();
    let mut builder = SdkTracerProvider::builder().with_sampler(Sampler::AlwaysOn);
    for (processor, exporter) in wired {
        match registry.processor(&processor.kind) {
            Some(factory) => {
                builder = factory.attach(builder, exporter, &processor.args)?;
                debug!(
                    processor = %processor.kind,
                    exporter = %processor.args.exporter,
                    "span processor attached"
                );
            }
            None => {
                warn!(kind = %processor.kind, "processor type unsupported");
            }
        }
    }

    Ok(builder.build())
}
