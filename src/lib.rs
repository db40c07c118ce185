//! OTel Schema Config
//!
//! Schema-validated configuration loader and tracer-provider bootstrap for
//! OpenTelemetry. A YAML or JSON document describing span processors and
//! exporters is validated against a JSON Schema, deserialized into typed
//! configuration, and wired into `opentelemetry_sdk`.
//!
//! # Features
//!
//! - YAML and JSON documents, validated against a JSON Schema
//! - Permissive validation: violations are logged and reported, not fatal
//! - Factory registry keyed by exporter/processor type (`otlp`, `batch`)
//! - OTLP over gRPC (plaintext or TLS) and HTTP/protobuf
//! - Best-effort startup: wiring errors degrade to tracing disabled
//!
//! # Example
//!
//! ```no_run
//! use otel_schema_config::{config::loader, pipeline};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), otel_schema_config::ConfigError> {
//! let config = loader::load_or_noop("config.yaml", "schema/schema.json");
//! let guard = pipeline::configure(&loader::apply_env_overrides(config));
//!
//! // ... run the application ...
//!
//! guard.shutdown()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod utils;

pub use config::{OpenTelemetryConfiguration, SchemaValidator, ValidationReport};
pub use error::ConfigError;
pub use logging::{init_logging, LoggingConfig};
pub use pipeline::registry::Registry;
pub use pipeline::{configure, configure_with_registry, PipelineState, TelemetryGuard};
