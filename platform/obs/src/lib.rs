//! Tracing setup for the registry binaries.

use anyhow::{Result, anyhow};
use once_cell::sync::OnceCell;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INSTALLED: OnceCell<()> = OnceCell::new();

const DEFAULT_FILTER: &str = "info,tower_http=warn,sqlx=warn";

/// Tracing configuration, resolved once at startup.
#[derive(Clone, Debug)]
pub struct ObsConfig {
    pub service_name: String,
    pub env_filter: String,
    pub otlp_endpoint: Option<String>,
}

impl ObsConfig {
    /// Resolves the filter from `RUST_LOG` and span export from
    /// `OTLP_ENDPOINT`; unset means local logging only.
    pub fn from_env(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            env_filter: std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string()),
            otlp_endpoint: std::env::var("OTLP_ENDPOINT").ok(),
        }
    }
}

/// Install the subscriber stack. Safe to call more than once; only the
/// first call takes effect.
pub fn init_tracing(config: ObsConfig) -> Result<()> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    let base = tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.env_filter)?)
        .with(tracing_subscriber::fmt::layer().with_target(false));

    match &config.otlp_endpoint {
        Some(endpoint) => {
            let provider = span_provider(&config.service_name, endpoint)?;
            let tracer = provider.tracer(config.service_name.clone());
            base.with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init()?;
        }
        None => base.try_init()?,
    }

    INSTALLED
        .set(())
        .map_err(|_| anyhow!("tracing already initialized"))?;
    Ok(())
}

fn span_provider(service_name: &str, endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = SpanExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpBinary)
        .with_endpoint(endpoint)
        .build()?;
    Ok(SdkTracerProvider::builder()
        .with_resource(
            Resource::builder()
                .with_service_name(service_name.to_string())
                .build(),
        )
        .with_batch_exporter(exporter)
        .build())
}
