//! Service-specific tests
//!
//! Each service has its own test file with dedicated fixtures and helpers.


// Common test utilities for services
pub mod common {
    use shared::{RunOptions, StepRecord, TestDescriptor, TestStatus};
    use std::time::Duration;
    use tokio::time::timeout;

    use crate::core::WorkerAssignment;

    /// Timeout for operations that wait on a real child process
    pub const PROCESS_TIMEOUT: Duration = Duration::from_secs(10);

    /// Helper to run async operations with timeout
    pub async fn with_timeout<T, F>(future: F) -> Result<T, tokio::time::error::Elapsed>
    where
        F: std::future::Future<Output = T>,
    {
        timeout(PROCESS_TIMEOUT, future).await
    }

    pub fn assignment(slot: usize, tests: &[&str]) -> WorkerAssignment {
        WorkerAssignment {
            generation: 1,
            slot,
            tests: tests.iter().map(|s| s.to_string()).collect(),
            options: RunOptions::default(),
        }
    }

    pub fn finished(name: &str, status: TestStatus) -> TestDescriptor {
        TestDescriptor {
            name: name.to_string(),
            status,
            results: vec![StepRecord {
                step: 0,
                action: "run: true".to_string(),
                passed: status == TestStatus::Passed,
                message: None,
                duration_ms: 12,
            }],
            finished_at: None,
        }
    }
}
