//! Observability hooks.
//!
//! A [`Reporter`] is told about every enqueued job, every completion, and the
//! end of the run. Hooks run inline on the producer, on workers or on the
//! drain loop, so they must return quickly: a hook that blocks stalls the
//! pool.

use crate::{Completion, RunSummary};

/// Receives progress events from a pool run. Every method defaults to a no-op.
pub trait Reporter<J>: Send + Sync + 'static {
    /// Called once `job` has a slot in the queue, just before it is handed
    /// over. Jobs refused after an abort are never reported.
    fn job_enqueued(&self, _seq: u64, _job: &J) {}

    /// Called once per finished job. `done` counts completions reported so
    /// far, including this one.
    fn job_completed(&self, _completion: &Completion, _done: usize, _total: usize) {}

    /// Called once after every job has completed.
    fn finished(&self, _summary: &RunSummary) {}
}

/// The silent reporter.
impl<J> Reporter<J> for () {}

/// Logs every event through `tracing`.
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

#[cfg(feature = "tracing")]
impl<J> Reporter<J> for TracingReporter {
    fn job_enqueued(&self, seq: u64, _job: &J) {
        tracing::debug!(seq, "Job enqueued");
    }

    fn job_completed(&self, completion: &Completion, done: usize, total: usize) {
        tracing::info!(
            seq = completion.seq,
            worker = completion.worker_id,
            elapsed_ms = completion.elapsed.as_secs_f64() * 1000.0,
            "Job completed ({done}/{total})"
        );
    }

    fn finished(&self, summary: &RunSummary) {
        tracing::info!(
            jobs = summary.jobs,
            workers = summary.workers,
            "Run finished in {:.2?}",
            summary.elapsed
        );
    }
}
