use super::Completion;
use crate::{CompletionOrder, Error, Result};
use std::collections::BTreeMap;
use tokio::sync::mpsc;

/// Creates the channel completion sink.
///
/// `capacity` should be the job count so that workers never wait on the
/// drain loop.
///
/// # Panics
///
/// Panics if `capacity` is zero.
pub fn completion_channel(
    capacity: usize,
    order: CompletionOrder,
) -> (ChannelSender, CompletionReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        ChannelSender(tx),
        CompletionReceiver {
            rx,
            order,
            pending: BTreeMap::new(),
            next_seq: 0,
        },
    )
}

/// Worker-side half of the completion channel.
#[derive(Clone, Debug)]
pub struct ChannelSender(mpsc::Sender<Completion>);

impl ChannelSender {
    /// Sends a completion; `false` if the receiver is gone.
    pub async fn send(&self, completion: Completion) -> bool {
        self.0.send(completion).await.is_ok()
    }
}

/// Orchestrator-side half of the completion channel.
#[derive(Debug)]
pub struct CompletionReceiver {
    rx: mpsc::Receiver<Completion>,
    order: CompletionOrder,
    // Early arrivals held back until every lower `seq` has been released.
    pending: BTreeMap<u64, Completion>,
    next_seq: u64,
}

impl CompletionReceiver {
    /// Receives the next completion in the configured order.
    ///
    /// Returns `None` once every sender is dropped and nothing is buffered.
    /// In submission order, completions stuck behind a gap that can no
    /// longer be filled are flushed in `seq` order after the channel closes.
    pub async fn recv(&mut self) -> Option<Completion> {
        match self.order {
            CompletionOrder::Arrival => self.rx.recv().await,
            CompletionOrder::Submission => loop {
                if let Some(completion) = self.pending.remove(&self.next_seq) {
                    self.next_seq += 1;
                    return Some(completion);
                }
                match self.rx.recv().await {
                    Some(completion) => {
                        self.pending.insert(completion.seq, completion);
                    }
                    None => return self.pending.pop_first().map(|(_, c)| c),
                }
            },
        }
    }

    /// Receives exactly `expected` completions, calling `on_each` with each
    /// one and the running count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Incomplete`] if the channel closes first.
    pub async fn drain<F>(&mut self, expected: usize, mut on_each: F) -> Result<usize>
    where
        F: FnMut(&Completion, usize),
    {
        for observed in 0..expected {
            match self.recv().await {
                Some(completion) => on_each(&completion, observed + 1),
                None => return Err(Error::Incomplete { expected, observed }),
            }
        }
        Ok(expected)
    }
}
