//! State of the single active run and its completion future

use shared::{ObserverUpdate, RunSummary};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tokio::sync::oneshot;

use crate::core::WorkerHandle;
use crate::error::SchedulerResult;
use crate::traits::Observer;

/// How a run ended, as seen by whoever awaits it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every worker exited; the summary is ready to publish
    Completed(RunSummary),
    /// The run was stopped or preempted before its workers all exited
    Cancelled,
}

/// Future resolving once the run it belongs to finishes or is discarded
#[derive(Debug)]
pub struct RunCompletion {
    rx: oneshot::Receiver<RunSummary>,
}

impl RunCompletion {
    pub fn channel() -> (oneshot::Sender<RunSummary>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// A completion that is already resolved with `summary`
    pub fn ready(summary: RunSummary) -> Self {
        let (tx, completion) = Self::channel();
        let _ = tx.send(summary);
        completion
    }
}

impl Future for RunCompletion {
    type Output = RunOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(summary)) => Poll::Ready(RunOutcome::Completed(summary)),
            // Sender dropped without a summary: the run was discarded.
            Poll::Ready(Err(_)) => Poll::Ready(RunOutcome::Cancelled),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Bookkeeping for the run currently in flight
pub struct RunState {
    generation: u64,
    pending: Vec<String>,
    workers: Vec<WorkerHandle>,
    running: usize,
    threads: usize,
    started_at: Instant,
    observer: Arc<dyn Observer>,
    completion: Option<oneshot::Sender<RunSummary>>,
}

impl RunState {
    pub fn new(
        generation: u64,
        pending: Vec<String>,
        threads: usize,
        observer: Arc<dyn Observer>,
        completion: oneshot::Sender<RunSummary>,
    ) -> Self {
        Self {
            generation,
            pending,
            workers: Vec::with_capacity(threads),
            running: 0,
            threads,
            started_at: Instant::now(),
            observer,
            completion: Some(completion),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Names of the tests the run was started with
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Whether `name` was assigned to the worker launched for `slot`
    pub fn owns(&self, slot: usize, name: &str) -> bool {
        self.workers
            .iter()
            .find(|worker| worker.slot() == slot)
            .is_some_and(|worker| worker.tests().iter().any(|test| test == name))
    }

    pub fn workers(&self) -> &[WorkerHandle] {
        &self.workers
    }

    /// Register a successfully launched worker
    pub fn add_worker(&mut self, handle: WorkerHandle) {
        self.workers.push(handle);
        self.running += 1;
    }

    /// Count of launched workers that have not reported an exit yet
    pub fn running(&self) -> usize {
        self.running
    }

    pub fn is_finished(&self) -> bool {
        self.running == 0
    }

    /// Record the exit of the worker in `slot`
    ///
    /// Returns false for an unknown slot or a repeated exit report.
    pub fn worker_exited(&mut self, slot: usize) -> bool {
        let Some(worker) = self.workers.iter_mut().find(|worker| worker.slot() == slot) else {
            return false;
        };
        if !worker.mark_exited() {
            return false;
        }
        self.running = self.running.saturating_sub(1);
        true
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            time: self.started_at.elapsed().as_millis() as u64,
            count: self.pending.len(),
            threads: self.threads,
        }
    }

    pub fn publish(&self, update: ObserverUpdate) -> SchedulerResult<()> {
        self.observer.publish(update)
    }

    /// Request termination of every worker of the run
    pub fn kill_all(&mut self) {
        for worker in &mut self.workers {
            worker.kill();
        }
    }

    /// Resolve the run's completion with its summary
    pub fn complete(mut self) -> RunSummary {
        let summary = self.summary();
        if let Some(completion) = self.completion.take() {
            // Nobody awaiting the run is not an error.
            let _ = completion.send(summary.clone());
        }
        summary
    }

    /// Discard the run without a summary, returning its test names
    pub fn cancel(mut self) -> Vec<String> {
        self.kill_all();
        self.completion.take();
        std::mem::take(&mut self.pending)
    }
}

impl std::fmt::Debug for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunState")
            .field("generation", &self.generation)
            .field("pending", &self.pending)
            .field("running", &self.running)
            .field("threads", &self.threads)
            .finish()
    }
}
