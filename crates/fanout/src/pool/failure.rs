use crate::Error;
use std::sync::{Mutex, PoisonError};

/// Holds the first error that aborted a run. Later errors are discarded.
#[derive(Debug, Default)]
pub struct FirstFailure(Mutex<Option<Error>>);

impl FirstFailure {
    /// Stores `err` unless a failure was already recorded. Returns whether it
    /// was stored.
    pub fn record(&self, err: Error) -> bool {
        let mut slot = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return false;
        }
        *slot = Some(err);
        true
    }

    pub fn take(&self) -> Option<Error> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}
