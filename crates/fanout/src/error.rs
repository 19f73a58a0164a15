//! Error types for the worker pool.
//!
//! This module defines the central `Error` enum, which captures every failure a
//! pool run can report back to its caller. Queue misuse (enqueue after close,
//! closing twice) is not represented here: those are programming errors and
//! panic at the call site.
//!
//! ## Error Cases
//! - `InvalidConfig`: The pool configuration violates an invariant (e.g. zero
//!   workers).
//! - `JobFailed`: A job executor returned an error. The run is aborted.
//! - `WorkerPanicked`: A worker task panicked while running a job.
//! - `Incomplete`: The completion channel closed before every job reported.

/// Boxed error returned by a job executor.
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for a pool run.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The pool was configured with values it cannot run with.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The executor failed on the job with submission index `seq`.
    ///
    /// This is fatal to the run: no new jobs are dispatched after it is
    /// observed.
    #[error("Job {seq} failed: {source}")]
    JobFailed {
        seq: u64,
        #[source]
        source: BoxError,
    },

    /// A worker task panicked.
    #[error("Worker {worker_id} panicked")]
    WorkerPanicked { worker_id: usize },

    /// Every completion sender was dropped before all signals arrived.
    #[error("Completion channel closed after {observed} of {expected} jobs")]
    Incomplete { expected: usize, observed: usize },
}

impl Error {
    /// Submission index of the failed job, if this is a job failure.
    pub const fn failed_seq(&self) -> Option<u64> {
        match self {
            Self::JobFailed { seq, .. } => Some(*seq),
            _ => None,
        }
    }
}
