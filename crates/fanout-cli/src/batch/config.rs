use anyhow::bail;
use clap::{Parser, ValueEnum};
use core::time::Duration;
use fanout::{CompletionOrder, PoolConfig, SinkKind};
use std::path::PathBuf;

/// Runtime configuration for the `fanout` binary.
///
/// Controls how many user records are generated, how many workers write them,
/// and how the run paces itself. All values are parsed from CLI arguments or
/// environment variables (a `.env` file is loaded first), with defaults that
/// reproduce the classic 100-users-over-12-workers batch.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fanout",
    version,
    about = "Generate user activity records and write each to its own file through a bounded worker pool"
)]
pub struct CliArgs {
    /// Number of users to generate. Each user is one job.
    ///
    /// Environment variable: `USER_COUNT`
    #[arg(long, env = "USER_COUNT", default_value_t = 100)]
    pub users: usize,

    /// Number of concurrent workers writing records. Must be greater than 0.
    ///
    /// Environment variable: `WORKER_COUNT`
    #[arg(long, env = "WORKER_COUNT", default_value_t = 12)]
    pub workers: usize,

    /// Maximum number of generated users waiting for a worker.
    ///
    /// Defaults to the user count, so generation never waits on writers. A
    /// smaller bound applies backpressure to the generator.
    ///
    /// Environment variable: `QUEUE_CAPACITY`
    #[arg(long, env = "QUEUE_CAPACITY")]
    pub queue_capacity: Option<usize>,

    /// Directory that receives one `uid<N>.txt` file per user.
    ///
    /// Environment variable: `OUTPUT_DIR`
    #[arg(long, env = "OUTPUT_DIR", default_value = "users")]
    pub output_dir: PathBuf,

    /// Upper bound (exclusive) on the number of activity entries per user.
    ///
    /// Environment variable: `MAX_LOG_ENTRIES`
    #[arg(long, env = "MAX_LOG_ENTRIES", default_value_t = 1000)]
    pub max_log_entries: usize,

    /// Pause after generating each user, in milliseconds.
    ///
    /// Environment variable: `GENERATE_DELAY_MS`
    #[arg(long, env = "GENERATE_DELAY_MS", default_value_t = 100)]
    pub generate_delay_ms: u64,

    /// Simulated latency of each record write, in milliseconds.
    ///
    /// Environment variable: `WRITE_DELAY_MS`
    #[arg(long, env = "WRITE_DELAY_MS", default_value_t = 1000)]
    pub write_delay_ms: u64,

    /// How the run tracks finished writes.
    ///
    /// Environment variable: `COMPLETION_SINK`
    #[arg(long, env = "COMPLETION_SINK", value_enum, default_value_t = SinkArg::Barrier)]
    pub sink: SinkArg,

    /// Report completed writes in generation order instead of as they finish.
    /// Requires `--sink channel`.
    ///
    /// Environment variable: `ORDERED_COMPLETIONS`
    #[arg(long, env = "ORDERED_COMPLETIONS", default_value_t = false)]
    pub ordered: bool,

    /// Seed for the activity generator. Random when omitted.
    ///
    /// Environment variable: `SEED`
    #[arg(long, env = "SEED")]
    pub seed: Option<u64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkArg {
    /// Countdown barrier decremented by each worker.
    Barrier,
    /// Channel of completion signals drained by the orchestrator.
    Channel,
}

impl From<SinkArg> for SinkKind {
    fn from(value: SinkArg) -> Self {
        match value {
            SinkArg::Barrier => Self::Barrier,
            SinkArg::Channel => Self::Channel,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub pool: PoolConfig,
    pub output_dir: PathBuf,
    pub max_log_entries: usize,
    pub generate_delay: Duration,
    pub write_delay: Duration,
    pub seed: Option<u64>,
}

impl TryFrom<CliArgs> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.workers == 0 {
            bail!("WORKER_COUNT must be greater than 0");
        }

        if args.queue_capacity == Some(0) {
            bail!("QUEUE_CAPACITY must be greater than 0");
        }

        if args.ordered && args.sink != SinkArg::Channel {
            bail!("ORDERED_COMPLETIONS requires COMPLETION_SINK=channel");
        }

        let mut pool = PoolConfig::new(args.users, args.workers)?.with_sink(args.sink.into());
        if let Some(capacity) = args.queue_capacity {
            pool = pool.with_queue_capacity(capacity)?;
        }
        if args.ordered {
            pool = pool.with_order(CompletionOrder::Submission);
        }

        Ok(Self {
            pool,
            output_dir: args.output_dir,
            max_log_entries: args.max_log_entries,
            generate_delay: Duration::from_millis(args.generate_delay_ms),
            write_delay: Duration::from_millis(args.write_delay_ms),
            seed: args.seed,
        })
    }
}
