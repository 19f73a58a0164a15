//! Spawning and joining the worker tasks of one run.
//!
//! Unlike a long-lived service pool, a [`WorkerPool`] lives for exactly one
//! batch: all workers pull from the same queue, so there is no per-worker
//! routing, and the pool is finished once every task has returned.

use super::worker::{WorkerContext, worker_loop};
use crate::{Error, JobExecutor, Reporter, Result};
use tokio::task::JoinHandle;

/// The worker tasks of a single run.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `workers` tasks, each running [`worker_loop`] over a clone of
    /// `ctx`.
    ///
    /// `ctx` is consumed so that the caller keeps no queue consumer or
    /// completion sender alive; the sinks rely on that to observe closure.
    pub fn spawn<J, E, R>(workers: usize, ctx: WorkerContext<J, E, R>) -> Self
    where
        J: Send + 'static,
        E: JobExecutor<J>,
        R: Reporter<J>,
    {
        let handles = (0..workers)
            .map(|worker_id| tokio::spawn(worker_loop(worker_id, ctx.clone())))
            .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!("Spawned {workers} workers");

        Self { handles }
    }

    /// Waits for every worker to return.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerPanicked`] for the lowest-indexed worker that
    /// panicked.
    pub async fn join(self) -> Result<()> {
        let results = futures::future::join_all(self.handles).await;

        for (worker_id, result) in results.into_iter().enumerate() {
            if let Err(_e) = result {
                #[cfg(feature = "tracing")]
                tracing::error!("Worker {worker_id} terminated abnormally: {_e}");
                return Err(Error::WorkerPanicked { worker_id });
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("All workers stopped");
        Ok(())
    }
}
