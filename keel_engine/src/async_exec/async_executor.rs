/// Fixed-size background worker pool
///
/// Jobs are queued on an unbounded crossbeam channel and picked up by
/// `max_concurrent` named threads. Each job reports through its own
/// one-shot channel wrapped in an [`AsyncResult`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use crossbeam_channel::Sender;
use crate::async_exec::AsyncResult;
use crate::error::{Error, Result};

/// Unit of work executed on a worker thread
pub trait AsyncTask<T>: Send + 'static {
    fn call(self) -> Result<T>;
}

impl<T, F> AsyncTask<T> for F
where
    F: FnOnce() -> Result<T> + Send + 'static,
{
    fn call(self) -> Result<T> {
        self()
    }
}

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct AsyncExecutor {
    name: String,
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl AsyncExecutor {
    /// Start `max_concurrent` worker threads named `{name}-{index}`
    pub fn new(max_concurrent: usize, name: &str) -> Result<Self> {
        if max_concurrent == 0 {
            return Err(crate::engine_err!(
                "keel::AsyncExecutor",
                InitializationFailed,
                "Executor '{}' needs at least one worker thread",
                name
            ));
        }

        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();
        let mut workers = Vec::with_capacity(max_concurrent);

        for index in 0..max_concurrent {
            let receiver = receiver.clone();
            let worker = thread::Builder::new()
                .name(format!("{}-{}", name, index))
                .spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        job();
                    }
                })
                .map_err(|e| {
                    crate::engine_err!(
                        "keel::AsyncExecutor",
                        InitializationFailed,
                        "Failed to spawn worker '{}-{}': {}",
                        name,
                        index,
                        e
                    )
                })?;
            workers.push(worker);
        }

        crate::engine_debug!(
            "keel::AsyncExecutor",
            "Started '{}' with {} worker(s)",
            name,
            max_concurrent
        );

        Ok(Self {
            name: name.to_string(),
            sender: Some(sender),
            workers,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn is_disposed(&self) -> bool {
        self.sender.is_none()
    }

    /// Queue a task for execution
    ///
    /// Panics inside the task are caught and reported as `BackendError`.
    pub fn submit<T, A>(&self, task: A) -> Result<AsyncResult<T>>
    where
        T: Send + 'static,
        A: AsyncTask<T>,
    {
        let sender = match &self.sender {
            Some(sender) => sender,
            None => {
                return Err(Error::BackendError(format!(
                    "Cannot run tasks on an executor that has been shutdown (disposed): {}",
                    self.name
                )))
            }
        };

        let (result_tx, result_rx) = crossbeam_channel::bounded(1);
        let job: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.call()))
                .unwrap_or_else(|payload| {
                    Err(Error::BackendError(format!(
                        "Background task panicked: {}",
                        panic_message(payload.as_ref())
                    )))
                });
            // Receiver may already be gone (task abandoned)
            let _ = result_tx.send(outcome);
        });

        sender.send(job).map_err(|_| {
            Error::BackendError(format!("Executor '{}' has no running workers", self.name))
        })?;

        Ok(AsyncResult::new(result_rx))
    }

    /// Close the job queue and wait for the workers to drain it
    pub fn dispose(&mut self) {
        if self.sender.take().is_none() {
            return;
        }
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        crate::engine_debug!("keel::AsyncExecutor", "Stopped '{}'", self.name);
    }
}

impl Drop for AsyncExecutor {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "async_executor_tests.rs"]
mod tests;
