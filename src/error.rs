//! Error types for configuration loading and pipeline wiring
//!
//! Loader failures are returned to the caller; wiring failures are caught by
//! [`crate::pipeline::configure`] and degrade to a no-op pipeline.

use thiserror::Error;

/// Error type for loader and wiring operations
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    ///
    /// Occurs when the document path does not exist or is not readable.
    #[error("I/O error: {0}")]
    IoError(String),

    /// Schema could not be read or compiled
    ///
    /// Occurs when the schema file is missing, is not JSON, or is not a valid
    /// JSON Schema.
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Document is neither valid YAML nor valid JSON
    ///
    /// Occurs on syntax errors such as unclosed brackets or bad indentation.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Document shape is incompatible with the configuration types
    ///
    /// Occurs when a field has the wrong type for the typed tree, e.g. a
    /// string where the span processor list is expected. Schema violations
    /// that still fit the types are reported, not raised.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// A span processor references an exporter id that is not declared
    ///
    /// Occurs when `args.exporter` names an id missing from `exporters`.
    #[error("exporter {0} not found")]
    ExporterNotFound(String),

    /// No exporter factory is registered for the id's type prefix
    ///
    /// Occurs for exporter types other than `otlp` (such as `console`) unless
    /// a factory was registered for them.
    #[error("invalid exporter: {0}")]
    UnsupportedExporter(String),

    /// The exporter factory failed to construct the exporter
    ///
    /// Occurs when the endpoint is not a valid URL or the OTLP client cannot
    /// be built.
    #[error("Exporter build error: {0}")]
    ExporterBuildError(String),

    /// Flushing or shutting down the tracer provider failed
    ///
    /// Occurs when an exporter fails to shut down or a flush times out.
    #[error("Shutdown error: {0}")]
    ShutdownError(String),

    /// The log subscriber could not be installed
    ///
    /// Occurs when the log level is invalid or a global subscriber is
    /// already set.
    #[error("Logging error: {0}")]
    LoggingError(String),
}

impl ConfigError {
    /// Check if the error came from loading the document
    ///
    /// Loader errors are the ones for which callers fall back to the
    /// no-op configuration.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            ConfigError::IoError(_)
                | ConfigError::SchemaError(_)
                | ConfigError::ParseError(_)
                | ConfigError::DeserializationError(_)
        )
    }

    /// Check if the error came from resolving or building the pipeline
    pub fn is_wiring_error(&self) -> bool {
        matches!(
            self,
            ConfigError::ExporterNotFound(_)
                | ConfigError::UnsupportedExporter(_)
                | ConfigError::ExporterBuildError(_)
        )
    }
}
