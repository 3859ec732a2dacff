// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A fixed-size worker pool for short background jobs.

use crossbeam_channel::{Receiver, Sender};
use pulse_core::utils::panic::panic_message;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use thiserror::Error;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Errors raised while building a [`TaskPool`].
#[derive(Debug, Error)]
pub enum PoolError {
    /// A pool needs at least one worker.
    #[error("a task pool needs at least one worker thread")]
    NoWorkers,
    /// The OS refused to spawn a worker.
    #[error("failed to spawn pool worker {index}: {source}")]
    Spawn {
        /// Index of the worker that could not be spawned.
        index: usize,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors observed when joining a task.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The job panicked. The payload message is kept.
    #[error("task panicked: {0}")]
    Panicked(String),
    /// The job was dropped before it could report a result.
    #[error("task was dropped before completing")]
    Disconnected,
}

/// The Async Task Pool.
///
/// A fixed set of named worker threads pull jobs off a shared queue. Jobs are
/// never cancelled; dropping the pool waits for queued jobs to finish.
pub struct TaskPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl TaskPool {
    /// Spawns a pool with `threads` workers.
    pub fn new(threads: usize) -> Result<Self, PoolError> {
        if threads == 0 {
            return Err(PoolError::NoWorkers);
        }

        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();
        let mut workers = Vec::with_capacity(threads);
        for index in 0..threads {
            let receiver = receiver.clone();
            let worker = thread::Builder::new()
                .name(format!("pulse-pool-{index}"))
                .spawn(move || worker_loop(receiver))
                .map_err(|source| PoolError::Spawn { index, source })?;
            workers.push(worker);
        }

        log::info!("Task pool started with {} worker(s).", threads);
        Ok(Self {
            sender: Some(sender),
            workers,
        })
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.workers.len()
    }

    /// Queues a job and returns a handle to its result.
    pub fn submit<F, T>(&self, job: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (result_tx, result_rx) = crossbeam_channel::bounded(1);
        self.execute(Box::new(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(job));
            // The submitter may have dropped its handle.
            let _ = result_tx.send(result);
        }));
        TaskHandle {
            receiver: result_rx,
        }
    }

    /// Queues a fire-and-forget job. A panic is logged and swallowed.
    pub fn detach<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.execute(Box::new(move || {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                log::error!("Detached task panicked: {}", panic_message(payload.as_ref()));
            }
        }));
    }

    fn execute(&self, job: Job) {
        let Some(sender) = &self.sender else {
            log::warn!("Task pool is shutting down; job dropped.");
            return;
        };
        if sender.send(job).is_err() {
            log::error!("Task pool queue is closed; job dropped.");
        }
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        // Closing the queue lets every worker drain and exit.
        self.sender.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::error!("A task pool worker terminated abnormally.");
            }
        }
        log::debug!("Task pool stopped.");
    }
}

impl std::fmt::Debug for TaskPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskPool")
            .field("threads", &self.workers.len())
            .finish_non_exhaustive()
    }
}

fn worker_loop(receiver: Receiver<Job>) {
    for job in receiver.iter() {
        job();
    }
}

/// A joinable handle to a submitted job.
#[derive(Debug)]
pub struct TaskHandle<T> {
    receiver: Receiver<thread::Result<T>>,
}

impl<T> TaskHandle<T> {
    /// A handle whose result is already known, for jobs run inline.
    pub fn from_result(result: thread::Result<T>) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        // Capacity is 1 and the receiver is alive, so this cannot fail.
        let _ = sender.send(result);
        Self { receiver }
    }

    /// Whether the job has finished and its result is waiting.
    pub fn is_ready(&self) -> bool {
        !self.receiver.is_empty()
    }

    /// Blocks until the job completes.
    pub fn wait(self) -> Result<T, TaskError> {
        match self.receiver.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => Err(TaskError::Panicked(panic_message(payload.as_ref()))),
            Err(_) => Err(TaskError::Disconnected),
        }
    }
}

/// A join barrier over a batch of task handles.
#[derive(Debug)]
pub struct JoinAll<T = ()> {
    handles: Vec<TaskHandle<T>>,
}

impl<T> JoinAll<T> {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Adds a handle to the batch.
    pub fn push(&mut self, handle: TaskHandle<T>) {
        self.handles.push(handle);
    }

    /// Number of handles not yet joined.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether the batch holds no handles.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Blocks until every task in the batch has completed, in submission
    /// order, and returns their results. The batch is empty afterwards.
    pub fn wait(&mut self) -> Vec<Result<T, TaskError>> {
        self.handles.drain(..).map(TaskHandle::wait).collect()
    }

    /// Releases every handle without joining it. The jobs keep running.
    pub fn clear(&mut self) {
        self.handles.clear();
    }
}

impl<T> Default for JoinAll<T> {
    fn default() -> Self {
        Self::new()
    }
}
