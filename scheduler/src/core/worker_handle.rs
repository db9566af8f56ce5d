//! Worker handles and the events workers report

use shared::{RunOptions, TestDescriptor};
use tokio::sync::oneshot;

/// Work given to one worker slot of a run
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerAssignment {
    /// Run the assignment belongs to
    pub generation: u64,
    pub slot: usize,
    /// Test names in the order the worker should run them
    pub tests: Vec<String>,
    pub options: RunOptions,
}

/// Event reported by a worker, tagged with its run and slot
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerEvent {
    pub generation: u64,
    pub slot: usize,
    pub kind: WorkerEventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEventKind {
    /// One assigned test finished
    TestCompleted(TestDescriptor),
    /// The worker process terminated; always the last event of a worker
    Exited { code: Option<i32> },
}

/// Scheduler-side handle of one launched worker
///
/// Termination is requested through a one-shot kill switch; the process's
/// exit is still reported asynchronously as a [`WorkerEventKind::Exited`].
#[derive(Debug)]
pub struct WorkerHandle {
    slot: usize,
    tests: Vec<String>,
    kill_tx: Option<oneshot::Sender<()>>,
    exited: bool,
}

impl WorkerHandle {
    pub fn new(slot: usize, tests: Vec<String>, kill_tx: oneshot::Sender<()>) -> Self {
        Self {
            slot,
            tests,
            kill_tx: Some(kill_tx),
            exited: false,
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn tests(&self) -> &[String] {
        &self.tests
    }

    /// Request termination of the worker process. Idempotent, never blocks.
    pub fn kill(&mut self) {
        if let Some(kill_tx) = self.kill_tx.take() {
            // The receiver is gone once the process has been reaped.
            let _ = kill_tx.send(());
        }
    }

    pub fn kill_requested(&self) -> bool {
        self.kill_tx.is_none()
    }

    /// Record the exit event; returns false if it was already recorded
    pub fn mark_exited(&mut self) -> bool {
        !std::mem::replace(&mut self.exited, true)
    }

    pub fn has_exited(&self) -> bool {
        self.exited
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        if !self.exited {
            self.kill();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kill_is_idempotent() {
        let (kill_tx, mut kill_rx) = oneshot::channel();
        let mut handle = WorkerHandle::new(0, vec!["a".to_string()], kill_tx);

        assert!(!handle.kill_requested());
        handle.kill();
        handle.kill();

        assert!(handle.kill_requested());
        assert_eq!(kill_rx.try_recv(), Ok(()));
    }

    #[test]
    fn test_kill_after_process_reaped_is_noop() {
        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        drop(kill_rx);
        let mut handle = WorkerHandle::new(1, Vec::new(), kill_tx);

        handle.kill();
        assert!(handle.kill_requested());
    }

    #[test]
    fn test_exit_recorded_once() {
        let (kill_tx, _kill_rx) = oneshot::channel();
        let mut handle = WorkerHandle::new(2, Vec::new(), kill_tx);

        assert!(handle.mark_exited());
        assert!(!handle.mark_exited());
        assert!(handle.has_exited());
    }

    #[test]
    fn test_drop_kills_running_worker() {
        let (kill_tx, mut kill_rx) = oneshot::channel();
        let handle = WorkerHandle::new(0, Vec::new(), kill_tx);
        drop(handle);

        assert_eq!(kill_rx.try_recv(), Ok(()));
    }
}
