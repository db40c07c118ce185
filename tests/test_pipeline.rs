//! Integration tests for pipeline wiring

mod common;

use common::{closed_local_endpoint, memory_registry};
use opentelemetry::trace::{Tracer, TracerProvider as _};
use otel_schema_config::config::{loader, ExporterSpec};
use otel_schema_config::pipeline::build_tracer_provider;
use otel_schema_config::{
    configure, configure_with_registry, ConfigError, OpenTelemetryConfiguration, PipelineState,
    Registry, SchemaValidator,
};
use std::time::{Duration, Instant};

fn parse(yaml: &str) -> OpenTelemetryConfiguration {
    let validator = SchemaValidator::bundled().unwrap();
    let (config, _) = loader::load_from_str(yaml, &validator).unwrap();
    config
}

#[test]
fn test_disabled_sdk_installs_nothing() {
    let config = parse(
        r#"
sdk:
  disabled: true
  tracer_provider:
    span_processors:
      - type: batch
        args:
          exporter: otlp/missing
"#,
    );

    let guard = configure(&config);
    assert_eq!(guard.state(), PipelineState::Disabled);
    assert!(guard.tracer_provider().is_none());
    assert!(guard.shutdown().is_ok());
}

#[test]
fn test_noop_config_shuts_down_cleanly() {
    let guard = configure(&OpenTelemetryConfiguration::noop());
    assert!(guard.shutdown().is_ok());
}

#[test]
fn test_missing_exporter_reference_installs_nothing() {
    let config = parse(
        r#"
sdk:
  tracer_provider:
    span_processors:
      - type: batch
        args:
          exporter: otlp/exporter2
    exporters:
      otlp/exporter1:
        endpoint: localhost:4317
"#,
    );

    let err = build_tracer_provider(&config.sdk.tracer_provider, &Registry::default()).unwrap_err();
    assert!(matches!(err, ConfigError::ExporterNotFound(ref id) if id == "otlp/exporter2"));

    let guard = configure(&config);
    assert_eq!(guard.state(), PipelineState::Failed);
    assert!(!guard.is_installed());
    assert!(guard.shutdown().is_ok());
}

#[test]
fn test_unrecognized_exporter_type_names_the_id() {
    let config = parse(
        r#"
sdk:
  tracer_provider:
    span_processors:
      - type: batch
        args:
          exporter: console
    exporters:
      console: {}
"#,
    );

    let err = build_tracer_provider(&config.sdk.tracer_provider, &Registry::default()).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedExporter(_)));
    assert!(err.to_string().contains("console"));

    let guard = configure(&config);
    assert_eq!(guard.state(), PipelineState::Failed);
}

#[test]
fn test_invalid_exporter_id() {
    let err = Registry::default()
        .create_exporter("invalid-type", &ExporterSpec::new())
        .unwrap_err();
    assert!(err.to_string().contains("invalid-type"));
}

#[test]
fn test_spans_reach_registered_exporter() {
    let (registry, exporters) = memory_registry(&["primary"]);
    let config = parse(
        r#"
sdk:
  tracer_provider:
    span_processors:
      - type: batch
        args:
          exporter: memory/primary
          schedule_delay: 60000
    exporters:
      memory/primary: {}
"#,
    );

    let guard = configure_with_registry(&config, &registry);
    assert_eq!(guard.state(), PipelineState::Installed);

    let tracer = guard.tracer_provider().unwrap().tracer("ExampleService");
    tracer.in_span("foo", |_cx| {});
    guard.force_flush().unwrap();

    let spans = exporters["primary"].get_finished_spans().unwrap();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].name, "foo");

    assert!(guard.shutdown().is_ok());
}

#[test]
fn test_unknown_processor_type_is_skipped() {
    let (registry, exporters) = memory_registry(&["skipped", "kept"]);
    let config = parse(
        r#"
sdk:
  tracer_provider:
    span_processors:
      - type: simple
        args:
          exporter: memory/skipped
      - type: batch
        args:
          exporter: memory/kept
    exporters:
      memory/skipped: {}
      memory/kept: {}
"#,
    );

    let guard = configure_with_registry(&config, &registry);
    assert_eq!(guard.state(), PipelineState::Installed);

    let tracer = guard.tracer_provider().unwrap().tracer("ExampleService");
    tracer.in_span("bar", |_cx| {});
    guard.force_flush().unwrap();

    assert_eq!(exporters["kept"].get_finished_spans().unwrap().len(), 1);
    assert!(exporters["skipped"].get_finished_spans().unwrap().is_empty());

    assert!(guard.shutdown().is_ok());
}

#[test]
fn test_exporter_factory_error_aborts_wiring() {
    let (registry, _exporters) = memory_registry(&["known"]);
    let config = parse(
        r#"
sdk:
  tracer_provider:
    span_processors:
      - type: batch
        args:
          exporter: memory/known
      - type: batch
        args:
          exporter: memory/unknown
    exporters:
      memory/known: {}
      memory/unknown: {}
"#,
    );

    let err = build_tracer_provider(&config.sdk.tracer_provider, &registry).unwrap_err();
    assert!(matches!(err, ConfigError::ExporterBuildError(_)));

    let guard = configure_with_registry(&config, &registry);
    assert_eq!(guard.state(), PipelineState::Failed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_minimal_otlp_document_round_trip() {
    let config = parse(
        r#"
sdk:
  disabled: false
  tracer_provider:
    span_processors:
      - type: batch
        args:
          exporter: otlp/exporter1
    exporters:
      otlp/exporter1:
        endpoint: localhost:4317
"#,
    );

    let guard = configure(&config);
    assert_eq!(guard.state(), PipelineState::Installed);
    assert!(guard.shutdown().is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_insecure_grpc_exporter_builds() {
    let spec = serde_json::json!({
        "endpoint": "localhost:4317",
        "insecure": true,
        "headers": { "api-key": "1234", "tenant": 7 }
    });

    let result = Registry::default().create_exporter("otlp/exporter1", spec.as_object().unwrap());
    assert!(result.is_ok());
}

fn grpc_document(endpoint: &str) -> OpenTelemetryConfiguration {
    parse(&format!(
        r#"
sdk:
  tracer_provider:
    span_processors:
      - type: batch
        args:
          exporter: otlp/exporter1
    exporters:
      otlp/exporter1:
        endpoint: "{}"
        insecure: true
        timeout: 1000
"#,
        endpoint
    ))
}

#[test]
fn test_grpc_in_synchronous_host_installs() {
    let guard = configure(&grpc_document(&closed_local_endpoint()));
    assert_eq!(guard.state(), PipelineState::Installed);

    let tracer = guard.tracer_provider().unwrap().tracer("ExampleService");
    tracer.in_span("sync", |_cx| {});

    assert!(guard.shutdown().is_ok());
}

#[tokio::test]
async fn test_grpc_shutdown_on_current_thread_runtime() {
    let guard = configure(&grpc_document(&closed_local_endpoint()));
    assert_eq!(guard.state(), PipelineState::Installed);

    let tracer = guard.tracer_provider().unwrap().tracer("ExampleService");
    tracer.in_span("current-thread", |_cx| {});

    let started = Instant::now();
    let result = guard.shutdown();
    assert!(result.is_ok(), "{:?}", result);
    assert!(started.elapsed() < Duration::from_secs(5));
}
