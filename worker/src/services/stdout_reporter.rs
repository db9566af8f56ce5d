//! Line-oriented result reporting
//!
//! Each message is one JSON line; the scheduler reads them from the
//! worker's stdout.

use async_trait::async_trait;
use shared::WorkerMessage;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::error::{WorkerError, WorkerResult};
use crate::traits::Reporter;

pub struct LineReporter<W> {
    writer: Mutex<W>,
}

/// Reporter writing to this process's stdout
pub type StdoutReporter = LineReporter<tokio::io::Stdout>;

impl<W> LineReporter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl StdoutReporter {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

#[async_trait]
impl<W> Reporter for LineReporter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn report(&self, message: WorkerMessage) -> WorkerResult<()> {
        let mut line = message.to_line()?;
        line.push('\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| WorkerError::ReportFailed { message: e.to_string() })?;
        // Flushed per line so the scheduler sees each result as it happens
        writer
            .flush()
            .await
            .map_err(|e| WorkerError::ReportFailed { message: e.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{TestDescriptor, TestStatus};

    #[tokio::test]
    async fn test_one_line_per_message() {
        let reporter = LineReporter::new(Vec::<u8>::new());
        let mut first = TestDescriptor::new("a");
        first.status = TestStatus::Passed;
        let mut second = TestDescriptor::new("b");
        second.status = TestStatus::Failed;

        reporter
            .report(WorkerMessage::TestCompleted { test: first.clone() })
            .await
            .unwrap();
        reporter
            .report(WorkerMessage::TestCompleted { test: second.clone() })
            .await
            .unwrap();

        let output = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            WorkerMessage::from_line(lines[0]).unwrap(),
            WorkerMessage::TestCompleted { test: first }
        );
        assert_eq!(
            WorkerMessage::from_line(lines[1]).unwrap(),
            WorkerMessage::TestCompleted { test: second }
        );
    }
}
