//! Global tracing subscriber setup.
//!
//! ```no_run
//! // Structured logs only; "warn" applies when RUST_LOG is unset.
//! tabletalk_observe::init_tracing("warn", false).unwrap();
//!
//! // Additionally export spans through the OTel stdout exporter.
//! tabletalk_observe::init_tracing("debug", true).unwrap();
//! ```

use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Keeps the OTel provider alive so `shutdown_tracing` can flush it.
static OTEL_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Install the global subscriber: a `fmt` layer showing targets and span
/// close timing, filtered by `RUST_LOG` when set and by `default_filter`
/// otherwise (the binary derives that string from its `-v` flags). With
/// `enable_otel`, spans are also bridged to OpenTelemetry via the stdout
/// exporter -- enough for local inspection, swap in OTLP for anything real.
///
/// Fails when a global subscriber is already installed.
pub fn init_tracing(
    default_filter: &str,
    enable_otel: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let otel_layer = enable_otel.then(|| {
        let provider = stdout_tracer_provider();
        let tracer = provider.tracer("tabletalk");
        let _ = OTEL_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);
        tracing_opentelemetry::layer().with_tracer(tracer)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE),
        )
        .with(otel_layer)
        .init();

    Ok(())
}

fn stdout_tracer_provider() -> SdkTracerProvider {
    SdkTracerProvider::builder()
        .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
        .build()
}

/// Flush buffered spans before exit. A no-op when OTel was never enabled.
pub fn shutdown_tracing() {
    if let Some(provider) = OTEL_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: failed to flush OTel spans on shutdown: {e}");
        }
    }
}
