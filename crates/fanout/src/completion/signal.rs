use core::time::Duration;

/// Emitted once per finished job.
///
/// Carries the job's submission index so that consumers can correlate
/// completions with the jobs they enqueued; completion order across workers
/// is otherwise arbitrary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// Submission index of the job.
    pub seq: u64,
    /// Worker that ran the job.
    pub worker_id: usize,
    /// Time spent inside the executor.
    pub elapsed: Duration,
}
