//! # Telemetry
//!
//! Logs always go through `tracing_subscriber::fmt` to stderr, filtered by
//! `RUST_LOG` (default `info`). Stdout is reserved for the batch's own
//! progress lines.
//!
//! With the `metrics` feature the run also records OpenTelemetry metrics and
//! exports them periodically to stdout:
//!
//! - `jobs_enqueued`: users handed to the worker pool
//! - `jobs_completed`: records written
//! - `job_duration` (ms): time a worker spent on one record
//! - `run_duration` (ms): wall time of the whole batch
//!
//! ```bash
//! cargo run -p fanout-cli --features metrics
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "metrics")]
use opentelemetry::metrics::{Counter, Histogram, Meter};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::{Resource, metrics as sdkmetrics};
#[cfg(feature = "metrics")]
use std::sync::OnceLock;

pub struct TelemetryProviders {
    #[cfg(feature = "metrics")]
    pub meter_provider: sdkmetrics::SdkMeterProvider,
}

impl TelemetryProviders {
    /// Flushes pending exports. Failures are printed, never returned: the
    /// batch result matters more than the last metrics interval.
    pub fn shutdown(self) {
        #[cfg(feature = "metrics")]
        {
            if let Err(err) = self.meter_provider.force_flush() {
                eprintln!("Error flushing metrics: {err:#?}");
            }
            if let Err(err) = self.meter_provider.shutdown() {
                eprintln!("Error shutting down meter: {err:#?}");
            }
        }
    }
}

pub fn init_telemetry() -> anyhow::Result<TelemetryProviders> {
    #[cfg(feature = "metrics")]
    let meter_provider = init_metrics();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true),
        )
        .try_init()?;

    #[cfg(feature = "metrics")]
    {
        opentelemetry::global::set_meter_provider(meter_provider.clone());
        init_metric_handles(&opentelemetry::global::meter("fanout"));
    }

    Ok(TelemetryProviders {
        #[cfg(feature = "metrics")]
        meter_provider,
    })
}

#[cfg(feature = "metrics")]
fn init_metrics() -> sdkmetrics::SdkMeterProvider {
    let exporter = opentelemetry_stdout::MetricExporter::default();
    let reader = sdkmetrics::PeriodicReader::builder(exporter)
        .with_interval(std::time::Duration::from_secs(5))
        .build();

    sdkmetrics::SdkMeterProvider::builder()
        .with_resource(Resource::builder().with_service_name("fanout").build())
        .with_reader(reader)
        .build()
}

#[cfg(feature = "metrics")]
static JOBS_ENQUEUED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static JOBS_COMPLETED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static JOB_DURATION_MS: OnceLock<Histogram<f64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static RUN_DURATION_MS: OnceLock<Histogram<f64>> = OnceLock::new();

#[cfg(feature = "metrics")]
fn init_metric_handles(meter: &Meter) {
    let _ = JOBS_ENQUEUED.set(
        meter
            .u64_counter("jobs_enqueued")
            .with_description("Users handed to the worker pool")
            .build(),
    );

    let _ = JOBS_COMPLETED.set(
        meter
            .u64_counter("jobs_completed")
            .with_description("User records written")
            .build(),
    );

    let _ = JOB_DURATION_MS.set(
        meter
            .f64_histogram("job_duration")
            .with_unit("ms")
            .with_description("Time a worker spent writing one record")
            .build(),
    );

    let _ = RUN_DURATION_MS.set(
        meter
            .f64_histogram("run_duration")
            .with_unit("ms")
            .with_description("Wall time of a batch run")
            .build(),
    );
}

// No-ops when metrics are disabled
#[cfg(feature = "metrics")]
pub fn increment_jobs_enqueued() {
    if let Some(counter) = JOBS_ENQUEUED.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_jobs_enqueued() {}

#[cfg(feature = "metrics")]
pub fn increment_jobs_completed() {
    if let Some(counter) = JOBS_COMPLETED.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_jobs_completed() {}

#[cfg(feature = "metrics")]
pub fn record_job_duration(duration_ms: f64) {
    if let Some(histogram) = JOB_DURATION_MS.get() {
        histogram.record(duration_ms, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_job_duration(_duration_ms: f64) {}

#[cfg(feature = "metrics")]
pub fn record_run_duration(duration_ms: f64) {
    if let Some(histogram) = RUN_DURATION_MS.get() {
        histogram.record(duration_ms, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_run_duration(_duration_ms: f64) {}
