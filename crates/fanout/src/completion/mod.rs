//! Completion tracking.
//!
//! Workers emit one [`Completion`] per finished job. The orchestrator learns
//! that the batch is done through one of two sinks:
//!
//! - [`CompletionBarrier`] - a counter pre-set to the job count that workers
//!   decrement; waiting resolves when it reaches zero.
//! - [`completion_channel`] - a bounded channel sized to the job count that the
//!   orchestrator drains, optionally re-ordered into submission order.
//!
//! [`CompletionSender`] is the worker-facing handle over either sink.

mod barrier;
mod channel;
mod signal;

pub use barrier::*;
pub use channel::*;
pub use signal::*;

/// Worker-side handle that records a finished job in the configured sink.
#[derive(Clone, Debug)]
pub enum CompletionSender {
    Barrier(CompletionBarrier),
    Channel(ChannelSender),
}

impl CompletionSender {
    /// Records one finished job.
    ///
    /// Returns `false` if the receiving side is gone and the signal was
    /// dropped.
    pub async fn signal(&self, completion: Completion) -> bool {
        match self {
            Self::Barrier(barrier) => {
                barrier.done();
                true
            }
            Self::Channel(tx) => tx.send(completion).await,
        }
    }

    /// Whether completions are reported by the worker that produced them
    /// rather than by the drain loop.
    pub const fn reports_inline(&self) -> bool {
        matches!(self, Self::Barrier(_))
    }
}
