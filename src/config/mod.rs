//! Configuration module
//!
//! This module handles document loading, schema validation, and the typed
//! configuration tree.

pub mod loader;
pub mod schema;
pub mod types;

pub use schema::{SchemaValidator, ValidationReport};
pub use types::{
    ExporterSpec, OpenTelemetryConfiguration, ProcessorArgs, SdkConfig, SpanProcessorConfig,
    TracerProviderConfig,
};
