//! OTLP exporter factory
//!
//! Exporter settings are normalized once into [`OtlpExporterConfig`], which
//! decides the transport ([`OtlpTransport`]). Only then is the
//! `opentelemetry-otlp` exporter built.

use crate::config::ExporterSpec;
use crate::error::ConfigError;
use crate::pipeline::exporter::{BoxedSpanExporter, ExporterFactory, ExporterId};
use crate::utils::coerce;
use opentelemetry_otlp::tonic_types::metadata::MetadataMap;
use opentelemetry_otlp::tonic_types::transport::ClientTlsConfig;
use opentelemetry_otlp::{Protocol, WithExportConfig, WithHttpConfig, WithTonicConfig};
use opentelemetry_sdk::error::OTelSdkResult;
use opentelemetry_sdk::trace::{SpanData, SpanExporter};
use opentelemetry_sdk::Resource;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, warn};
use url::Url;

/// Protocol value that selects the HTTP transport
pub const HTTP_PROTOBUF: &str = "http/protobuf";

/// Path appended to HTTP endpoints that carry none
const TRACES_PATH: &str = "/v1/traces";

/// Wire protocol requested by the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtlpProtocol {
    /// gRPC (the default for anything but `http/protobuf`)
    Grpc,
    /// Protobuf over HTTP
    HttpProtobuf,
}

/// Transport security of a gRPC channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportSecurity {
    /// Plaintext, no TLS
    Insecure,
    /// TLS with the system trust roots
    Tls,
}

/// Normalized OTLP exporter settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtlpExporterConfig {
    /// Collector endpoint as written (optional, exporter default if absent)
    pub endpoint: Option<String>,
    /// Requested protocol
    pub protocol: OtlpProtocol,
    /// Disable transport security (default: false)
    pub insecure: bool,
    /// Headers sent with every export
    pub headers: BTreeMap<String, String>,
    /// Export timeout
    pub timeout: Option<Duration>,
}

/// Transport chosen for an exporter, with its final endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtlpTransport {
    /// gRPC via tonic
    Grpc {
        endpoint: Option<String>,
        security: TransportSecurity,
        headers: BTreeMap<String, String>,
    },
    /// HTTP via the blocking reqwest client
    Http {
        endpoint: Option<String>,
        headers: BTreeMap<String, String>,
    },
}

impl OtlpExporterConfig {
    /// Normalize untyped exporter settings
    ///
    /// Unknown keys are ignored. Values of the wrong shape are coerced where a
    /// sensible reading exists and dropped with a warning otherwise.
    pub fn from_spec(spec: &ExporterSpec) -> Self {
        let endpoint = spec
            .get("endpoint")
            .map(coerce::value_to_string)
            .filter(|endpoint| !endpoint.trim().is_empty());

        let protocol = match spec.get("protocol").map(coerce::value_to_string) {
            Some(protocol) if protocol == HTTP_PROTOBUF => OtlpProtocol::HttpProtobuf,
            _ => OtlpProtocol::Grpc,
        };

        let insecure = match spec.get("insecure") {
            None => false,
            Some(value) => coerce::value_to_bool(value).unwrap_or_else(|| {
                warn!(value = %value, "insecure is not a boolean, using false");
                false
            }),
        };

        let headers = spec
            .get("headers")
            .map(coerce::value_to_string_map)
            .unwrap_or_default();

        let timeout = spec.get("timeout").and_then(|value| {
            let millis = coerce::value_to_u64(value);
            if millis.is_none() {
                warn!(value = %value, "timeout is not a number of milliseconds, ignoring");
            }
            millis.map(Duration::from_millis)
        });

        Self {
            endpoint,
            protocol,
            insecure,
            headers,
            timeout,
        }
    }

    /// Decide the transport and final endpoint
    ///
    /// # Errors
    ///
    /// Returns `ExporterBuildError` if the endpoint is not a valid URL once a
    /// scheme has been supplied.
    pub fn transport(&self) -> Result<OtlpTransport, ConfigError> {
        match self.protocol {
            OtlpProtocol::HttpProtobuf => Ok(OtlpTransport::Http {
                endpoint: self
                    .endpoint
                    .as_deref()
                    .map(|endpoint| self.http_endpoint(endpoint))
                    .transpose()?,
                headers: self.headers.clone(),
            }),
            OtlpProtocol::Grpc => Ok(OtlpTransport::Grpc {
                endpoint: self
                    .endpoint
                    .as_deref()
                    .map(|endpoint| self.grpc_endpoint(endpoint))
                    .transpose()?,
                security: if self.insecure {
                    TransportSecurity::Insecure
                } else {
                    TransportSecurity::Tls
                },
                headers: self.headers.clone(),
            }),
        }
    }

    fn default_scheme(&self) -> &'static str {
        if self.insecure {
            "http"
        } else {
            "https"
        }
    }

    fn with_scheme(&self, endpoint: &str) -> Result<Url, ConfigError> {
        let endpoint = endpoint.trim();
        let full = if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("{}://{}", self.default_scheme(), endpoint)
        };
        Url::parse(&full).map_err(|e| {
            ConfigError::ExporterBuildError(format!("invalid endpoint '{}': {}", endpoint, e))
        })
    }

    fn grpc_endpoint(&self, endpoint: &str) -> Result<String, ConfigError> {
        let url = self.with_scheme(endpoint)?;
        // tonic takes scheme://host:port; drop the trailing slash Url adds
        Ok(url.as_str().trim_end_matches('/').to_string())
    }

    fn http_endpoint(&self, endpoint: &str) -> Result<String, ConfigError> {
        let mut url = self.with_scheme(endpoint)?;
        if url.path().is_empty() || url.path() == "/" {
            url.set_path(TRACES_PATH);
        }
        Ok(url.to_string())
    }
}

/// Factory for `otlp` exporters
#[derive(Debug, Clone, Copy, Default)]
pub struct OtlpExporterFactory;

impl ExporterFactory for OtlpExporterFactory {
    fn create(
        &self,
        id: &ExporterId,
        spec: &ExporterSpec,
    ) -> Result<BoxedSpanExporter, ConfigError> {
        let config = OtlpExporterConfig::from_spec(spec);
        let transport = config.transport()?;
        debug!(exporter = %id, transport = ?transport, "building OTLP exporter");

        match transport {
            OtlpTransport::Http { endpoint, headers } => {
                build_http(id, endpoint, headers, config.timeout).map(BoxedSpanExporter::new)
            }
            OtlpTransport::Grpc {
                endpoint,
                security,
                headers,
            } => build_grpc(id, endpoint, security, headers, config.timeout)
                .map(BoxedSpanExporter::new),
        }
    }
}

fn build_http(
    id: &ExporterId,
    endpoint: Option<String>,
    headers: BTreeMap<String, String>,
    timeout: Option<Duration>,
) -> Result<opentelemetry_otlp::SpanExporter, ConfigError> {
    let mut builder = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpBinary);

    if let Some(endpoint) = endpoint {
        builder = builder.with_endpoint(endpoint);
    }
    if let Some(timeout) = timeout {
        builder = builder.with_timeout(timeout);
    }
    if !headers.is_empty() {
        builder = builder.with_headers(headers.into_iter().collect::<HashMap<_, _>>());
    }

    builder
        .build()
        .map_err(|e| ConfigError::ExporterBuildError(format!("{}: {}", id, e)))
}

fn build_grpc(
    id: &ExporterId,
    endpoint: Option<String>,
    security: TransportSecurity,
    headers: BTreeMap<String, String>,
    timeout: Option<Duration>,
) -> Result<GrpcSpanExporter, ConfigError> {
    let mut builder = opentelemetry_otlp::SpanExporter::builder().with_tonic();

    if let Some(endpoint) = endpoint {
        builder = builder.with_endpoint(endpoint);
    }
    if let Some(timeout) = timeout {
        builder = builder.with_timeout(timeout);
    }
    if security == TransportSecurity::Tls {
        builder = builder.with_tls_config(ClientTlsConfig::new().with_enabled_roots());
    }
    if !headers.is_empty() {
        builder = builder.with_metadata(headers_to_metadata(&headers));
    }

    // tonic spawns its connection tasks on the runtime current at build time
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("otlp-grpc")
        .enable_all()
        .build()
        .map_err(|e| {
            ConfigError::ExporterBuildError(format!("{}: failed to create runtime: {}", id, e))
        })?;

    let built = {
        let _entered = runtime.enter();
        builder.build()
    };

    match built {
        Ok(exporter) => Ok(GrpcSpanExporter {
            exporter,
            runtime: Some(runtime),
        }),
        Err(e) => {
            runtime.shutdown_background();
            Err(ConfigError::ExporterBuildError(format!("{}: {}", id, e)))
        }
    }
}

/// OTLP/gRPC exporter together with the runtime that drives its channel
///
/// Exports and shutdown never depend on the host's executor, which may be a
/// current-thread runtime or no runtime at all.
#[derive(Debug)]
struct GrpcSpanExporter {
    exporter: opentelemetry_otlp::SpanExporter,
    runtime: Option<Runtime>,
}

impl SpanExporter for GrpcSpanExporter {
    fn export(
        &self,
        batch: Vec<SpanData>,
    ) -> impl std::future::Future<Output = OTelSdkResult> + Send {
        self.exporter.export(batch)
    }

    fn shutdown_with_timeout(&mut self, timeout: Duration) -> OTelSdkResult {
        self.exporter.shutdown_with_timeout(timeout)
    }

    fn force_flush(&mut self) -> OTelSdkResult {
        self.exporter.force_flush()
    }

    fn set_resource(&mut self, resource: &Resource) {
        self.exporter.set_resource(resource)
    }
}

impl Drop for GrpcSpanExporter {
    fn drop(&mut self) {
        // a blocking runtime drop panics when this runs inside async code
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Convert headers to gRPC metadata, skipping entries that are not valid ASCII metadata
fn headers_to_metadata(headers: &BTreeMap<String, String>) -> MetadataMap {
    let mut map = http::HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        match (
            http::HeaderName::from_bytes(key.as_bytes()),
            http::HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => warn!(header = %key, "skipping header that is not valid gRPC metadata"),
        }
    }
    MetadataMap::from_headers(map)
}
