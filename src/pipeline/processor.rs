//! Span processor factories
//!
//! A processor factory wraps an exporter in a span processor and attaches it
//! to the tracer provider under construction.

use crate::config::ProcessorArgs;
use crate::error::ConfigError;
use crate::pipeline::exporter::BoxedSpanExporter;
use crate::utils::coerce;
use opentelemetry_sdk::trace::{BatchConfigBuilder, BatchSpanProcessor, TracerProviderBuilder};
use std::time::Duration;
use tracing::warn;

/// Attaches a processor of one kind to a tracer provider builder
pub trait ProcessorFactory: Send + Sync {
    /// Wrap `exporter` and add the resulting processor to `builder`
    fn attach(
        &self,
        builder: TracerProviderBuilder,
        exporter: BoxedSpanExporter,
        args: &ProcessorArgs,
    ) -> Result<TracerProviderBuilder, ConfigError>;
}

/// Tuning for the batch span processor, all optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSettings {
    /// Delay between two consecutive exports
    pub schedule_delay: Option<Duration>,
    /// Maximum queue size before spans are dropped
    pub max_queue_size: Option<usize>,
    /// Maximum number of spans per export
    pub max_export_batch_size: Option<usize>,
}

impl BatchSettings {
    /// Read batch settings from processor args
    ///
    /// Values that are not non-negative integers are logged and ignored, as
    /// are sizes of zero, which would make the processor drop every span.
    pub fn from_args(args: &ProcessorArgs) -> Self {
        let read = |key: &str| {
            args.extra.get(key).and_then(|value| {
                let parsed = coerce::value_to_u64(value);
                if parsed.is_none() {
                    warn!(key, value = %value, "ignoring non-numeric batch setting");
                }
                parsed
            })
        };
        let read_size = |key: &str| {
            read(key).and_then(|size| {
                if size == 0 {
                    warn!(key, "ignoring zero batch size");
                    return None;
                }
                usize::try_from(size).ok()
            })
        };

        Self {
            schedule_delay: read("schedule_delay").map(Duration::from_millis),
            max_queue_size: read_size("max_queue_size"),
            max_export_batch_size: read_size("max_export_batch_size"),
        }
    }
}

/// Factory for `batch` processors
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchProcessorFactory;

impl ProcessorFactory for BatchProcessorFactory {
    fn attach(
        &self,
        builder: TracerProviderBuilder,
        exporter: BoxedSpanExporter,
        args: &ProcessorArgs,
    ) -> Result<TracerProviderBuilder, ConfigError> {
        let settings = BatchSettings::from_args(args);

        let mut batch_config = BatchConfigBuilder::default();
        if let Some(delay) = settings.schedule_delay {
            batch_config = batch_config.with_scheduled_delay(delay);
        }
        if let Some(size) = settings.max_queue_size {
            batch_config = batch_config.with_max_queue_size(size);
        }
        if let Some(size) = settings.max_export_batch_size {
            batch_config = batch_config.with_max_export_batch_size(size);
        }

        let processor = BatchSpanProcessor::builder(exporter)
            .with_batch_config(batch_config.build())
            .build();

        Ok(builder.with_span_processor(processor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::{Tracer, TracerProvider as _};
    use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider};
    use serde_json::json;

    fn args(value: serde_json::Value) -> ProcessorArgs {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_batch_settings_defaults() {
        let settings = BatchSettings::from_args(&args(json!({ "exporter": "otlp/a" })));
        assert_eq!(settings, BatchSettings::default());
    }

    #[test]
    fn test_batch_settings_read() {
        let settings = BatchSettings::from_args(&args(json!({
            "exporter": "otlp/a",
            "schedule_delay": 250,
            "max_queue_size": "4096",
            "max_export_batch_size": 128
        })));

        assert_eq!(settings.schedule_delay, Some(Duration::from_millis(250)));
        assert_eq!(settings.max_queue_size, Some(4096));
        assert_eq!(settings.max_export_batch_size, Some(128));
    }

    #[test]
    fn test_batch_settings_ignore_garbage() {
        let settings = BatchSettings::from_args(&args(json!({
            "exporter": "otlp/a",
            "max_queue_size": "lots"
        })));
        assert_eq!(settings.max_queue_size, None);
    }

    #[test]
    fn test_batch_settings_ignore_zero_sizes() {
        let settings = BatchSettings::from_args(&args(json!({
            "exporter": "otlp/a",
            "schedule_delay": 0,
            "max_queue_size": 0,
            "max_export_batch_size": "0"
        })));

        assert_eq!(settings.schedule_delay, Some(Duration::ZERO));
        assert_eq!(settings.max_queue_size, None);
        assert_eq!(settings.max_export_batch_size, None);
    }

    #[test]
    fn test_zero_sizes_still_export() {
        let exporter = InMemorySpanExporter::default();
        let builder = BatchProcessorFactory
            .attach(
                SdkTracerProvider::builder(),
                BoxedSpanExporter::new(exporter.clone()),
                &args(json!({
                    "exporter": "memory/a",
                    "max_queue_size": 0,
                    "max_export_batch_size": 0
                })),
            )
            .unwrap();
        let provider = builder.build();

        provider.tracer("batch").in_span("kept", |_cx| {});
        provider.force_flush().unwrap();

        let spans = exporter.get_finished_spans().unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].name, "kept");
        provider.shutdown().unwrap();
    }
}
