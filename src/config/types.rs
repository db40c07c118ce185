//! Configuration types for the tracer-provider document
//!
//! These mirror the document shape one-to-one. Exporter settings stay an
//! untyped key/value bag here; each exporter factory normalizes its own keys.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Untyped exporter settings, keyed by field name
pub type ExporterSpec = serde_json::Map<String, serde_json::Value>;

/// Root of a configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenTelemetryConfiguration {
    /// SDK section
    #[serde(default)]
    pub sdk: SdkConfig,
}

impl OpenTelemetryConfiguration {
    /// Configuration that wires nothing
    ///
    /// Returned when loading fails so that the host keeps starting with
    /// tracing disabled.
    pub fn noop() -> Self {
        Self {
            sdk: SdkConfig {
                disabled: true,
                tracer_provider: TracerProviderConfig::default(),
            },
        }
    }
}

/// SDK section of the document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SdkConfig {
    /// When true no processors or exporters are constructed (default: false)
    #[serde(default)]
    pub disabled: bool,
    /// Tracer provider setup
    #[serde(default)]
    pub tracer_provider: TracerProviderConfig,
}

/// Span processors plus the exporters they reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TracerProviderConfig {
    /// Processors in declaration order
    #[serde(default)]
    pub span_processors: Vec<SpanProcessorConfig>,
    /// Exporter settings keyed by exporter id (`<type>/<instance-name>`)
    ///
    /// An exporter declared without a body (`otlp/exporter1:` in YAML) gets
    /// empty settings, i.e. all defaults.
    #[serde(default, deserialize_with = "exporters_or_defaults")]
    pub exporters: BTreeMap<String, ExporterSpec>,
}

fn exporters_or_defaults<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, ExporterSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    let exporters: Option<BTreeMap<String, Option<ExporterSpec>>> =
        Option::deserialize(deserializer)?;
    Ok(exporters
        .unwrap_or_default()
        .into_iter()
        .map(|(id, spec)| (id, spec.unwrap_or_default()))
        .collect())
}

impl TracerProviderConfig {
    /// Look up the settings for an exporter id
    pub fn exporter(&self, id: &str) -> Option<&ExporterSpec> {
        self.exporters.get(id)
    }
}

/// A declared span processor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanProcessorConfig {
    /// Processor kind, e.g. `batch`
    #[serde(rename = "type")]
    pub kind: String,
    /// Processor arguments
    #[serde(default)]
    pub args: ProcessorArgs,
}

/// Arguments of a span processor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessorArgs {
    /// Id of the exporter this processor feeds
    #[serde(default)]
    pub exporter: String,
    /// Processor-specific settings (batch tuning and the like)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
