//! Runs one batch end to end.
//!
//! [`Orchestrator::run`] wires a [`JobSource`] to a fresh queue, a fresh set
//! of workers and a fresh completion sink, then waits until every job has
//! reported. Nothing survives between runs, so one orchestrator can run any
//! number of independent batches.

use crate::{
    CompletionBarrier, CompletionReceiver, CompletionSender, Error, JobExecutor, JobProducer,
    JobSource, PoolConfig, Reporter, Result, SinkKind, completion_channel,
    pool::{failure::FirstFailure, manager::WorkerPool, worker::WorkerContext},
    queue,
};
use core::time::Duration;
use portable_atomic::AtomicUsize;
use std::sync::Arc;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub jobs: usize,
    pub workers: usize,
    /// Completion signals observed; equal to `jobs` on success.
    pub completed: usize,
    /// Wall-clock time from start-up to the last completion.
    pub elapsed: Duration,
}

/// Drives a batch through the worker pool.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: PoolConfig,
    produce_interval: Option<Duration>,
}

/// Orchestrator-side half of the configured completion sink.
enum CompletionWait {
    Barrier(CompletionBarrier),
    Channel(CompletionReceiver),
}

impl Orchestrator {
    pub const fn new(config: PoolConfig) -> Self {
        Self {
            config,
            produce_interval: None,
        }
    }

    /// Pauses for `interval` after enqueueing each job, pacing the producer.
    #[must_use]
    pub const fn with_produce_interval(mut self, interval: Duration) -> Self {
        self.produce_interval = Some(interval);
        self
    }

    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Runs `config.jobs()` jobs from `source` through `executor`.
    ///
    /// Sequence: start the clock, spawn the workers, enqueue every job and
    /// close the queue, wait for all completions, join the workers, report.
    ///
    /// # Errors
    ///
    /// - [`Error::JobFailed`] if the executor failed. No job is dequeued after
    ///   the failure is observed; jobs already running are allowed to finish
    ///   before this returns.
    /// - [`Error::WorkerPanicked`] if a worker panicked.
    /// - [`Error::Incomplete`] if the completion channel closed early.
    pub async fn run<S, E, R>(&self, source: &mut S, executor: E, reporter: R) -> Result<RunSummary>
    where
        S: JobSource,
        E: JobExecutor<S::Job>,
        R: Reporter<S::Job>,
    {
        let start = Instant::now();
        let total = self.config.jobs();
        let workers = self.config.workers();

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Starting run: {total} jobs, {workers} workers, queue capacity {}, {:?} sink",
            self.config.queue_capacity(),
            self.config.sink()
        );

        let (mut producer, consumer) = queue::bounded(self.config.queue_capacity());
        let abort = CancellationToken::new();
        let failure = Arc::new(FirstFailure::default());
        let reporter = Arc::new(reporter);

        let (completions, mut wait) = match self.config.sink() {
            SinkKind::Barrier => {
                let barrier = CompletionBarrier::new(total);
                (
                    CompletionSender::Barrier(barrier.clone()),
                    CompletionWait::Barrier(barrier),
                )
            }
            SinkKind::Channel => {
                let (tx, rx) =
                    completion_channel(self.config.completion_capacity(), self.config.order());
                (CompletionSender::Channel(tx), CompletionWait::Channel(rx))
            }
        };

        let pool = WorkerPool::spawn(
            workers,
            WorkerContext {
                consumer,
                executor: Arc::new(executor),
                reporter: Arc::clone(&reporter),
                completions,
                abort: abort.clone(),
                failure: Arc::clone(&failure),
                finished: Arc::new(AtomicUsize::new(0)),
                total,
            },
        );

        let enqueued = self
            .feed(source, &mut producer, total, &abort, reporter.as_ref())
            .await;
        producer.close();

        #[cfg(feature = "tracing")]
        tracing::debug!("Enqueued {enqueued} jobs, queue closed");

        // A source that ran dry leaves slots no worker will ever fill.
        let short = total - enqueued;
        if short > 0 {
            wait.release(short);
        }

        let mut drained = 0;
        let waited = tokio::select! {
            result = wait.until_done(total, |completion, done| {
                drained = done;
                reporter.job_completed(completion, done, total);
            }) => Some(result),
            () = abort.cancelled() => None,
        };

        // Workers stop on their own once the queue drains or the run aborts.
        let joined = pool.join().await;

        if let Some(err) = failure.take() {
            #[cfg(feature = "tracing")]
            tracing::error!("Run aborted after {enqueued} enqueued jobs: {err}");
            return Err(err);
        }
        joined?;

        if short > 0 {
            #[cfg(feature = "tracing")]
            tracing::error!("Source produced {enqueued} of {total} jobs");
            return Err(Error::Incomplete {
                expected: total,
                observed: enqueued,
            });
        }

        let completed = match waited {
            Some(result) => result?,
            None => {
                return Err(Error::Incomplete {
                    expected: total,
                    observed: drained,
                });
            }
        };

        let summary = RunSummary {
            jobs: total,
            workers,
            completed,
            elapsed: start.elapsed(),
        };
        reporter.finished(&summary);

        #[cfg(feature = "tracing")]
        tracing::info!("Run complete in {:.2?}", summary.elapsed);

        Ok(summary)
    }

    /// Enqueues up to `count` jobs from `source`, stopping early if the run is
    /// aborted or the source runs dry. Returns the number of jobs accepted by
    /// the queue. `job_enqueued` is reported only for accepted jobs.
    async fn feed<S, R>(
        &self,
        source: &mut S,
        producer: &mut JobProducer<S::Job>,
        count: usize,
        abort: &CancellationToken,
        reporter: &R,
    ) -> usize
    where
        S: JobSource,
        R: Reporter<S::Job>,
    {
        let mut enqueued = 0;
        for job in source.produce(count).take(count) {
            let accepted = tokio::select! {
                biased;
                () = abort.cancelled() => break,
                accepted = producer.enqueue_with(job, |seq, job| {
                    reporter.job_enqueued(seq, job);
                }) => accepted,
            };
            if accepted.is_err() {
                break;
            }
            enqueued += 1;

            if let Some(interval) = self.produce_interval {
                tokio::select! {
                    biased;
                    () = abort.cancelled() => break,
                    () = sleep(interval) => {}
                }
            }
        }

        enqueued
    }
}

impl CompletionWait {
    /// Forgets `count` jobs that were never enqueued. The channel sink needs
    /// nothing: it sees its senders close once the workers stop.
    fn release(&self, count: usize) {
        if let Self::Barrier(barrier) = self {
            barrier.release(count);
        }
    }

    /// Resolves once `total` jobs have completed. Channel completions are
    /// reported through `on_drain` as they are drained; barrier completions
    /// were already reported by the workers.
    async fn until_done<F>(&mut self, total: usize, on_drain: F) -> Result<usize>
    where
        F: FnMut(&crate::Completion, usize),
    {
        match self {
            Self::Barrier(barrier) => {
                barrier.wait().await;
                Ok(total)
            }
            Self::Channel(rx) => rx.drain(total, on_drain).await,
        }
    }
}
