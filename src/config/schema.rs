//! JSON Schema validation of configuration documents
//!
//! Validation never rejects a document on its own: violations are collected
//! into a [`ValidationReport`] and logged, and the caller decides what to do.

use crate::error::ConfigError;
use std::path::Path;
use tracing::{info, warn};

/// Schema shipped with the crate
const BUNDLED_SCHEMA: &str = include_str!("../../schema/schema.json");

/// Compiled JSON Schema
pub struct SchemaValidator {
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator").finish_non_exhaustive()
    }
}

/// Outcome of validating one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// One message per schema violation, in the order the engine reported them
    pub violations: Vec<String>,
}

impl ValidationReport {
    /// True when the document satisfied the schema
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Log the report: one info line when valid, otherwise one warning per violation
    pub fn log(&self) {
        if self.is_valid() {
            info!("The document is valid");
            return;
        }
        warn!(
            violations = self.violations.len(),
            "The document is not valid. see errors:"
        );
        for violation in &self.violations {
            warn!(error = %violation, "schema violation");
        }
    }
}

impl SchemaValidator {
    /// Compile a schema from a file
    ///
    /// The path is made absolute before it is read.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if the file cannot be read, is not JSON, or is
    /// not a valid schema.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = std::path::absolute(path.as_ref()).map_err(|e| {
            ConfigError::SchemaError(format!(
                "Failed to resolve schema path {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let content = std::fs::read_to_string(&path).map_err(|e| {
            ConfigError::SchemaError(format!(
                "Failed to read schema {}: {}",
                path.display(),
                e
            ))
        })?;

        let schema: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
            ConfigError::SchemaError(format!(
                "Schema {} is not valid JSON: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_value(&schema)
    }

    /// Compile a schema from an in-memory JSON value
    pub fn from_value(schema: &serde_json::Value) -> Result<Self, ConfigError> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|e| ConfigError::SchemaError(format!("Invalid schema: {}", e)))?;
        Ok(Self { validator })
    }

    /// Compile the schema bundled with this crate
    pub fn bundled() -> Result<Self, ConfigError> {
        let schema: serde_json::Value = serde_json::from_str(BUNDLED_SCHEMA)
            .map_err(|e| ConfigError::SchemaError(format!("Bundled schema is invalid: {}", e)))?;
        Self::from_value(&schema)
    }

    /// Validate a document, collecting every violation
    pub fn validate(&self, document: &serde_json::Value) -> ValidationReport {
        let violations = self
            .validator
            .iter_errors(document)
            .map(|error| error.to_string())
            .collect();
        ValidationReport { violations }
    }
}
