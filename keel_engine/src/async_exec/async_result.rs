/// Handle to the outcome of a submitted task
///
/// The worker sends exactly one message through a bounded channel. The
/// handle caches it once observed so `is_done()` can be polled every frame.

use crossbeam_channel::{Receiver, TryRecvError};
use crate::error::Result;

pub struct AsyncResult<T> {
    receiver: Receiver<Result<T>>,
    outcome: Option<Result<T>>,
    disconnected: bool,
}

impl<T> AsyncResult<T> {
    pub(crate) fn new(receiver: Receiver<Result<T>>) -> Self {
        Self {
            receiver,
            outcome: None,
            disconnected: false,
        }
    }

    /// Non-blocking completion check
    ///
    /// Also true when the worker went away without producing anything.
    pub fn is_done(&mut self) -> bool {
        if self.outcome.is_some() || self.disconnected {
            return true;
        }
        match self.receiver.try_recv() {
            Ok(outcome) => {
                self.outcome = Some(outcome);
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                self.disconnected = true;
                true
            }
        }
    }

    /// Wait for the task and take its value
    ///
    /// Returns `Ok(None)` if the task was dropped before it produced a result.
    pub fn get(mut self) -> Result<Option<T>> {
        if let Some(outcome) = self.outcome.take() {
            return outcome.map(Some);
        }
        if self.disconnected {
            return Ok(None);
        }
        match self.receiver.recv() {
            Ok(outcome) => outcome.map(Some),
            Err(_) => Ok(None),
        }
    }
}

impl<T> std::fmt::Debug for AsyncResult<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncResult")
            .field("received", &self.outcome.is_some())
            .field("disconnected", &self.disconnected)
            .finish()
    }
}
