//! Configure tracing from `config.yaml` and emit one span
//!
//! Run from the crate root:
//!
//! ```sh
//! cargo run --example basic
//! ```

use opentelemetry::trace::{Tracer, TracerProvider as _};
use otel_schema_config::config::loader;
use otel_schema_config::{configure, init_logging, LoggingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(&LoggingConfig::default())?;

    let config = loader::load_from_file("config.yaml", "schema/schema.json")?;
    let guard = configure(&loader::apply_env_overrides(config));

    let tracer = opentelemetry::global::tracer_provider().tracer("ExampleService");
    tracer.in_span("foo", |_cx| {
        tracing::info!("inside span");
    });

    guard.shutdown()?;
    Ok(())
}
