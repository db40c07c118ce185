//! Integration tests for error types

use otel_schema_config::ConfigError;

#[test]
fn test_load_errors() {
    assert!(ConfigError::IoError("test".to_string()).is_load_error());
    assert!(ConfigError::SchemaError("test".to_string()).is_load_error());
    assert!(ConfigError::ParseError("test".to_string()).is_load_error());
    assert!(ConfigError::DeserializationError("test".to_string()).is_load_error());

    assert!(!ConfigError::ExporterNotFound("otlp/a".to_string()).is_load_error());
    assert!(!ConfigError::ShutdownError("test".to_string()).is_load_error());
}

#[test]
fn test_wiring_errors() {
    assert!(ConfigError::ExporterNotFound("otlp/a".to_string()).is_wiring_error());
    assert!(ConfigError::UnsupportedExporter("console".to_string()).is_wiring_error());
    assert!(ConfigError::ExporterBuildError("test".to_string()).is_wiring_error());

    assert!(!ConfigError::IoError("test".to_string()).is_wiring_error());
    assert!(!ConfigError::LoggingError("test".to_string()).is_wiring_error());
}

#[test]
fn test_error_display() {
    let error = ConfigError::ExporterNotFound("otlp/exporter1".to_string());
    assert_eq!(error.to_string(), "exporter otlp/exporter1 not found");

    let error = ConfigError::UnsupportedExporter("console".to_string());
    assert!(error.to_string().contains("console"));

    let error = ConfigError::ParseError("bad indent".to_string());
    let error_str = format!("{}", error);
    assert!(error_str.contains("Parse error"));
    assert!(error_str.contains("bad indent"));
}

#[test]
fn test_error_clone() {
    let error = ConfigError::ShutdownError("test".to_string());
    let cloned = error.clone();
    assert!(matches!(cloned, ConfigError::ShutdownError(_)));
}
