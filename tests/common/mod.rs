//! Common test utilities
//!
//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use opentelemetry_sdk::trace::InMemorySpanExporter;
use otel_schema_config::config::ExporterSpec;
use otel_schema_config::pipeline::exporter::{BoxedSpanExporter, ExporterId};
use otel_schema_config::{ConfigError, Registry};
use std::collections::HashMap;
use std::fs;
use std::net::TcpListener;
use std::path::PathBuf;
use tempfile::TempDir;

/// Path of the schema shipped with the crate
pub fn schema_path() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/schema/schema.json"))
}

/// Write `content` to `name` inside `dir` and return its path
pub fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

/// A `host:port` on loopback with nothing listening
///
/// Exports to it fail fast with a refused connection.
pub fn closed_local_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind loopback port");
    let port = listener
        .local_addr()
        .expect("Failed to read loopback port")
        .port();
    format!("127.0.0.1:{}", port)
}

/// Default registry plus a `memory` exporter type
///
/// Each instance name in `instances` gets its own in-memory exporter; the
/// returned map lets tests read what each one received.
pub fn memory_registry(instances: &[&str]) -> (Registry, HashMap<String, InMemorySpanExporter>) {
    let exporters: HashMap<String, InMemorySpanExporter> = instances
        .iter()
        .map(|name| (name.to_string(), InMemorySpanExporter::default()))
        .collect();

    let lookup = exporters.clone();
    let registry = Registry::default().with_exporter(
        "memory",
        move |id: &ExporterId, _spec: &ExporterSpec| -> Result<BoxedSpanExporter, ConfigError> {
            let exporter = id
                .instance()
                .and_then(|name| lookup.get(name))
                .ok_or_else(|| ConfigError::ExporterBuildError(format!("{}: unknown instance", id)))?;
            Ok(BoxedSpanExporter::new(exporter.clone()))
        },
    );

    (registry, exporters)
}
