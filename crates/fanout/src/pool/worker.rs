use super::failure::FirstFailure;
use crate::{
    Completion, CompletionSender, Envelope, Error, JobConsumer, JobExecutor, Reporter,
};
use portable_atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Everything a worker shares with its siblings and the orchestrator.
pub struct WorkerContext<J, E, R> {
    pub consumer: JobConsumer<J>,
    pub executor: Arc<E>,
    pub reporter: Arc<R>,
    pub completions: CompletionSender,
    pub abort: CancellationToken,
    pub failure: Arc<FirstFailure>,
    /// Completions reported inline so far (barrier sink only).
    pub finished: Arc<AtomicUsize>,
    pub total: usize,
}

impl<J, E, R> Clone for WorkerContext<J, E, R> {
    fn clone(&self) -> Self {
        Self {
            consumer: self.consumer.clone(),
            executor: Arc::clone(&self.executor),
            reporter: Arc::clone(&self.reporter),
            completions: self.completions.clone(),
            abort: self.abort.clone(),
            failure: Arc::clone(&self.failure),
            finished: Arc::clone(&self.finished),
            total: self.total,
        }
    }
}

/// Worker task responsible for executing queued jobs.
///
/// The worker pulls one [`Envelope`] at a time from the shared queue, awaits
/// the executor on it, and emits exactly one [`Completion`] for each job that
/// succeeds. It runs until the queue is closed and drained, or until the run
/// is aborted.
///
/// # Arguments
///
/// - `worker_id`: Index of this worker within the pool (used for completion
///   tagging and logs).
/// - `ctx`: Queue consumer, executor, completion sink and abort token shared
///   with the rest of the pool.
///
/// # Failure
///
/// - An executor error is stored as [`Error::JobFailed`] and cancels the
///   abort token. The worker then stops.
/// - Once the token is cancelled, no worker dequeues another job; jobs already
///   executing run to completion.
/// - A panic inside the executor cancels the token as the task unwinds.
pub async fn worker_loop<J, E, R>(worker_id: usize, ctx: WorkerContext<J, E, R>)
where
    J: Send + 'static,
    E: JobExecutor<J>,
    R: Reporter<J>,
{
    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} started");

    // Cancels the run if this task unwinds mid-job.
    let abort_on_panic = ctx.abort.clone().drop_guard();

    loop {
        let next = tokio::select! {
            biased;
            () = ctx.abort.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Worker {worker_id} observed abort");
                break;
            }
            next = ctx.consumer.dequeue() => next,
        };

        let Some(Envelope { seq, job }) = next else {
            break;
        };

        let started = Instant::now();
        if let Err(e) = ctx.executor.execute(job).await {
            #[cfg(feature = "tracing")]
            tracing::error!("Worker {worker_id} failed job {seq}: {e}");

            ctx.failure.record(Error::JobFailed {
                seq,
                source: Box::new(e),
            });
            ctx.abort.cancel();
            break;
        }

        let completion = Completion {
            seq,
            worker_id,
            elapsed: started.elapsed(),
        };

        // Report before signalling so that the final progress event is
        // observed before the orchestrator is released.
        if ctx.completions.reports_inline() {
            let done = ctx.finished.fetch_add(1, Ordering::AcqRel) + 1;
            ctx.reporter.job_completed(&completion, done, ctx.total);
        }

        if !ctx.completions.signal(completion).await {
            #[cfg(feature = "tracing")]
            tracing::warn!("Worker {worker_id} lost the completion sink");
            break;
        }
    }

    abort_on_panic.disarm();

    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} stopped");
}
