use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::error::DbAccessError;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Bounded pool of worker threads that physically execute all engine calls.
///
/// Workers share one job queue; once dispatched, ready jobs may run in any
/// order. Dropping the pool closes the queue and joins every worker after it
/// drains.
pub(crate) struct WorkerPool {
    sender: Option<Sender<Job>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub(crate) fn spawn(workers: usize) -> Result<Self, DbAccessError> {
        if workers == 0 {
            return Err(DbAccessError::Connection(
                "worker pool needs at least one worker".into(),
            ));
        }

        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));
        let mut handles = Vec::with_capacity(workers);
        for index in 0..workers {
            let receiver = Arc::clone(&receiver);
            let handle = thread::Builder::new()
                .name(format!("db-access-{index}"))
                .spawn(move || worker_loop(&receiver))
                .map_err(|err| {
                    DbAccessError::Connection(format!(
                        "failed to spawn database worker thread: {err}"
                    ))
                })?;
            handles.push(handle);
        }
        tracing::debug!(workers, "database worker pool started");

        Ok(Self {
            sender: Some(sender),
            handles,
        })
    }

    pub(crate) fn submit<F>(&self, job: F) -> Result<(), DbAccessError>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or_else(|| {
            DbAccessError::Connection("database worker pool is shut down".into())
        })?;
        sender.send(Box::new(job)).map_err(|_| {
            DbAccessError::Connection("database worker pool is shut down".into())
        })
    }
}

fn worker_loop(receiver: &Mutex<Receiver<Job>>) {
    loop {
        let job = {
            let Ok(guard) = receiver.lock() else {
                return;
            };
            guard.recv()
        };
        match job {
            Ok(job) => job(),
            // Queue closed; all submitted work has been drained.
            Err(_) => break,
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        drop(self.sender.take());
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}
