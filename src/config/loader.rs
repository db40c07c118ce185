//! Configuration loader
//!
//! This module handles loading configuration documents from YAML or JSON
//! files, validating them against a JSON Schema, and applying environment
//! overrides.

use crate::config::schema::{SchemaValidator, ValidationReport};
use crate::config::OpenTelemetryConfiguration;
use crate::error::ConfigError;
use std::path::Path;
use tracing::{error, info};

/// Environment variable that disables the SDK when set to `true`
pub const OTEL_SDK_DISABLED: &str = "OTEL_SDK_DISABLED";

/// Load and validate a configuration file
///
/// Schema violations are logged but do not fail the load; use
/// [`load_from_file_with_report`] to inspect them.
///
/// # Arguments
///
/// * `path` - Path to a YAML or JSON configuration file
/// * `schema_path` - Path to the JSON Schema the document must satisfy
///
/// # Errors
///
/// Returns `IoError`, `SchemaError`, `ParseError` or `DeserializationError`.
pub fn load_from_file<P, S>(
    path: P,
    schema_path: S,
) -> Result<OpenTelemetryConfiguration, ConfigError>
where
    P: AsRef<Path>,
    S: AsRef<Path>,
{
    load_from_file_with_report(path, schema_path).map(|(config, _)| config)
}

/// Load a configuration file and return the schema report alongside it
pub fn load_from_file_with_report<P, S>(
    path: P,
    schema_path: S,
) -> Result<(OpenTelemetryConfiguration, ValidationReport), ConfigError>
where
    P: AsRef<Path>,
    S: AsRef<Path>,
{
    let validator = SchemaValidator::from_path(schema_path)?;

    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        ConfigError::IoError(format!(
            "Failed to read config file {}: {}",
            path.as_ref().display(),
            e
        ))
    })?;

    load_from_str(&content, &validator)
}

/// Load a configuration document held in memory
///
/// YAML is a superset of JSON, so both formats go through the YAML parser
/// and come out as a JSON value before validation.
pub fn load_from_str(
    content: &str,
    validator: &SchemaValidator,
) -> Result<(OpenTelemetryConfiguration, ValidationReport), ConfigError> {
    let document = parse_document(content)?;

    let report = validator.validate(&document);
    report.log();

    let config: OpenTelemetryConfiguration = serde_json::from_value(document).map_err(|e| {
        error!("Failed to unmarshal configuration");
        ConfigError::DeserializationError(e.to_string())
    })?;

    Ok((config, report))
}

/// Convert YAML or JSON text into a JSON value
pub fn parse_document(content: &str) -> Result<serde_json::Value, ConfigError> {
    let document: serde_json::Value = serde_yaml::from_str(content)
        .map_err(|e| ConfigError::ParseError(format!("Failed to parse document: {}", e)))?;

    // An empty file parses as null; treat it as an empty document
    if document.is_null() {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }
    Ok(document)
}

/// Load a configuration file, falling back to the no-op configuration
///
/// Fatal loading errors are logged and replaced by
/// [`OpenTelemetryConfiguration::noop`], so the host keeps starting with
/// tracing disabled.
pub fn load_or_noop<P, S>(path: P, schema_path: S) -> OpenTelemetryConfiguration
where
    P: AsRef<Path>,
    S: AsRef<Path>,
{
    match load_from_file(path, schema_path) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration, tracing disabled");
            OpenTelemetryConfiguration::noop()
        }
    }
}

/// Apply environment overrides from the process environment
///
/// Reads `OTEL_SDK_DISABLED`; a value of `true` (any case) disables the SDK.
pub fn apply_env_overrides(config: OpenTelemetryConfiguration) -> OpenTelemetryConfiguration {
    apply_env_overrides_from(config, |key| std::env::var(key).ok())
}

/// Apply environment overrides using a custom variable lookup
pub fn apply_env_overrides_from<F>(
    mut config: OpenTelemetryConfiguration,
    lookup: F,
) -> OpenTelemetryConfiguration
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(OTEL_SDK_DISABLED) {
        if value.trim().eq_ignore_ascii_case("true") {
            info!("{} is set, SDK disabled", OTEL_SDK_DISABLED);
            config.sdk.disabled = true;
        }
    }
    config
}
