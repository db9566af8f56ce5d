//! Trait definitions with mockall annotations for testing
//!
//! Every collaborator of the run supervisor sits behind one of these traits:
//! the results store, the worker process launcher, and the observer that
//! receives progress updates. The supervisor is generic over them so tests
//! can inject mocks or in-memory fakes.

use async_trait::async_trait;
use shared::{ObserverUpdate, TestDescriptor};
use tokio::sync::mpsc;

use crate::core::{WorkerAssignment, WorkerEvent, WorkerHandle};
use crate::error::SchedulerResult;

/// Authoritative list of known tests and their last known results
#[mockall::automock]
#[async_trait]
pub trait ResultsStore: Send + Sync {
    /// Load every known test with its last status and results
    async fn load(&self) -> SchedulerResult<Vec<TestDescriptor>>;

    /// Persist the full list of tests
    async fn save(&self, tests: &[TestDescriptor]) -> SchedulerResult<()>;
}

/// Spawns worker processes
///
/// A launched worker reports through `events`: zero or more test completions
/// followed by exactly one exit event, each tagged with the assignment's
/// generation and slot.
#[mockall::automock]
#[async_trait]
pub trait WorkerLauncher: Send + Sync {
    /// Start one worker process for `assignment`
    async fn launch(
        &self,
        assignment: WorkerAssignment,
        events: mpsc::UnboundedSender<WorkerEvent>,
    ) -> SchedulerResult<WorkerHandle>;
}

/// Receives progress updates for the runs it requested
#[mockall::automock]
pub trait Observer: Send + Sync {
    /// Push one update to the observer
    fn publish(&self, update: ObserverUpdate) -> SchedulerResult<()>;
}
