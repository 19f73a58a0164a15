#![doc = include_str!("../README.md")]

mod batch;

use anyhow::Context;
use batch::activity::{ActivityContext, ActivitySource};
use batch::config::{CliArgs, RunConfig};
use batch::console::ConsoleReporter;
use batch::telemetry::init_telemetry;
use batch::writer::RecordWriter;
use clap::Parser;
use fanout::{Orchestrator, RunSummary};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = RunConfig::try_from(args)?;

    let providers = init_telemetry()?;
    log_startup_info(&config);

    let result = run_batch(config).await;
    if let Err(e) = &result {
        tracing::error!("Batch aborted: {e:#}");
    }

    providers.shutdown();
    result.map(|summary| {
        println!(
            "DONE! Time Elapsed: {:.2} seconds",
            summary.elapsed.as_secs_f64()
        );
    })
}

async fn run_batch(config: RunConfig) -> anyhow::Result<RunSummary> {
    let ctx = match config.seed {
        Some(seed) => ActivityContext::seeded(seed),
        None => ActivityContext::from_os_rng(),
    }
    .with_max_log_entries(config.max_log_entries);
    let mut source = ActivitySource::new(ctx);

    let writer = RecordWriter::create(&config.output_dir, config.write_delay)
        .await
        .with_context(|| format!("failed to create {}", config.output_dir.display()))?;
    tracing::info!("Writing records to {}", writer.dir().display());

    let mut orchestrator = Orchestrator::new(config.pool);
    if !config.generate_delay.is_zero() {
        orchestrator = orchestrator.with_produce_interval(config.generate_delay);
    }

    let summary = orchestrator
        .run(&mut source, writer, ConsoleReporter)
        .await?;
    Ok(summary)
}

fn log_startup_info(config: &RunConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting batch with full config: {:#?}", config);
    } else {
        tracing::info!(
            "Starting batch: {} users over {} workers",
            config.pool.jobs(),
            config.pool.workers()
        );
    }
}
