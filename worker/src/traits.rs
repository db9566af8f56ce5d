//! Worker trait definitions for dependency injection

use async_trait::async_trait;
use shared::{TestDescriptor, WorkerMessage};

use crate::error::WorkerResult;

/// Runs one test to completion
#[mockall::automock]
#[async_trait]
pub trait TestExecutor: Send + Sync {
    /// Execute the named test; problems become a failed descriptor
    async fn execute(&self, name: &str) -> TestDescriptor;
}

/// Sends results back to the scheduler
#[mockall::automock]
#[async_trait]
pub trait Reporter: Send + Sync {
    async fn report(&self, message: WorkerMessage) -> WorkerResult<()>;
}
