//! Pool configuration.
//!
//! [`PoolConfig`] is fixed for the lifetime of a run: how many jobs to
//! produce, how many workers consume them, how deep the job queue is, and how
//! the orchestrator learns that the batch is finished.

use crate::{Error, Result};

/// How the orchestrator tracks finished jobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SinkKind {
    /// Countdown barrier decremented by each worker.
    #[default]
    Barrier,
    /// Bounded channel of completion signals drained by the orchestrator.
    Channel,
}

/// Order in which the channel sink reports completions.
///
/// Ignored by the barrier sink, which reports each completion from the worker
/// that produced it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletionOrder {
    /// As workers finish.
    #[default]
    Arrival,
    /// In submission order, holding back completions that finish early.
    Submission,
}

/// Validated runtime configuration for one pool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    jobs: usize,
    workers: usize,
    queue_capacity: usize,
    sink: SinkKind,
    order: CompletionOrder,
}

impl PoolConfig {
    /// Creates a configuration for `jobs` jobs over `workers` workers.
    ///
    /// The queue capacity defaults to the job count, so the producer never
    /// waits on workers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `workers` is zero.
    pub fn new(jobs: usize, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::InvalidConfig {
                reason: "worker count must be greater than 0".to_string(),
            });
        }

        Ok(Self {
            jobs,
            workers,
            queue_capacity: jobs.max(1),
            sink: SinkKind::default(),
            order: CompletionOrder::default(),
        })
    }

    /// Bounds the job queue. Smaller capacities only change when the producer
    /// waits, not what gets processed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `capacity` is zero.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidConfig {
                reason: "queue capacity must be greater than 0".to_string(),
            });
        }
        self.queue_capacity = capacity;
        Ok(self)
    }

    #[must_use]
    pub const fn with_sink(mut self, sink: SinkKind) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub const fn with_order(mut self, order: CompletionOrder) -> Self {
        self.order = order;
        self
    }

    pub const fn jobs(&self) -> usize {
        self.jobs
    }

    pub const fn workers(&self) -> usize {
        self.workers
    }

    pub const fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub const fn sink(&self) -> SinkKind {
        self.sink
    }

    pub const fn order(&self) -> CompletionOrder {
        self.order
    }

    /// Capacity of the completion channel: one slot per job.
    pub(crate) const fn completion_capacity(&self) -> usize {
        if self.jobs == 0 { 1 } else { self.jobs }
    }
}
