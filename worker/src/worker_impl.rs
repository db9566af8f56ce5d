//! Worker implementation with dependency injection

use shared::{process_info, ProcessId, WorkerMessage};

use crate::error::WorkerResult;
use crate::traits::{Reporter, TestExecutor};

/// Runs its assigned tests one after the other, reporting each
pub struct Worker<E, R>
where
    E: TestExecutor,
    R: Reporter,
{
    executor: E,
    reporter: R,
    tests: Vec<String>,
}

impl<E, R> Worker<E, R>
where
    E: TestExecutor,
    R: Reporter,
{
    pub fn new(tests: Vec<String>, executor: E, reporter: R) -> Self {
        Self {
            executor,
            reporter,
            tests,
        }
    }

    pub fn tests(&self) -> &[String] {
        &self.tests
    }

    /// Execute every assigned test in order
    ///
    /// A failing test never stops the loop; a failure to report does, since
    /// nobody is listening any more. Returns the number of tests reported.
    pub async fn run(&self) -> WorkerResult<usize> {
        let mut reported = 0;
        for name in &self.tests {
            let test = self.executor.execute(name).await;
            process_info!(ProcessId::current(), "🧪 {} {}", test.name, test.status);
            self.reporter
                .report(WorkerMessage::TestCompleted { test })
                .await?;
            reported += 1;
        }
        Ok(reported)
    }
}
