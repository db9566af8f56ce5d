//! Core shared types and identifiers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::errors::{SharedError, SharedResult};

static PROCESS_ID: OnceLock<ProcessId> = OnceLock::new();
static FALLBACK_PROCESS_ID: ProcessId = ProcessId::Scheduler;

/// Process identifier for any component in the system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessId {
    /// Scheduler process (singleton, also hosts the web observer channel)
    Scheduler,
    /// Worker process, numbered by the slot it was launched for
    Worker(usize),
}

impl ProcessId {
    /// Initialize the global process ID for the scheduler
    pub fn init_scheduler() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Scheduler)
    }

    /// Initialize the global process ID for a worker with explicit slot
    pub fn init_worker(slot: usize) -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Worker(slot))
    }

    /// Get the global process ID, defaulting to the scheduler when uninitialized
    pub fn current() -> &'static ProcessId {
        PROCESS_ID.get().unwrap_or(&FALLBACK_PROCESS_ID)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::Scheduler => write!(f, "scheduler"),
            ProcessId::Worker(slot) => write!(f, "worker_{slot}"),
        }
    }
}

/// Lifecycle status of a single test
///
/// The scheduler only distinguishes three groups: `Pending` (assigned and
/// awaiting a result), `Unsettled` (was pending when its run was cancelled)
/// and the terminal statuses reported by a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    #[default]
    Idle,
    Pending,
    Running,
    Unsettled,
    Passed,
    Failed,
}

impl TestStatus {
    /// Whether this status was supplied by a worker as a final result
    pub fn is_terminal(&self) -> bool {
        matches!(self, TestStatus::Passed | TestStatus::Failed)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TestStatus::Idle => "idle",
            TestStatus::Pending => "pending",
            TestStatus::Running => "running",
            TestStatus::Unsettled => "unsettled",
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One result record produced while executing a test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub step: usize,
    pub action: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub duration_ms: u64,
}

/// A named test case with its last known status and results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDescriptor {
    pub name: String,
    #[serde(default)]
    pub status: TestStatus,
    #[serde(default)]
    pub results: Vec<StepRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl TestDescriptor {
    /// Create an idle descriptor with no results
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Idle,
            results: Vec::new(),
            finished_at: None,
        }
    }

    /// Reset to the state a test has when it is selected for a run
    pub fn reset_pending(&mut self) {
        self.status = TestStatus::Pending;
        self.results.clear();
        self.finished_at = None;
    }
}

/// Options that shape a single run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Disable headless mode in the workers
    pub no_headless: bool,
    /// Requested number of worker processes
    pub worker_count: usize,
    /// Replay speed multiplier passed to the workers
    pub replay_speed: f64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            no_headless: false,
            worker_count: 1,
            replay_speed: 1.0,
        }
    }
}

/// Terminal summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Wall-clock duration of the run in milliseconds
    pub time: u64,
    /// Number of tests the run was started with
    pub count: usize,
    /// Number of worker processes the run used
    pub threads: usize,
}

/// Join test names into the single positional argument a worker receives
pub fn encode_test_list(names: &[String]) -> SharedResult<String> {
    if let Some(bad) = names.iter().find(|name| name.is_empty() || name.contains(',')) {
        return Err(SharedError::InvalidConfig {
            field: "test_name".to_string(),
            value: bad.clone(),
        });
    }
    Ok(names.join(","))
}

/// Split the worker's positional test list back into names
pub fn decode_test_list(encoded: &str) -> Vec<String> {
    encoded
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&TestStatus::Unsettled).unwrap();
        assert_eq!(json, "\"unsettled\"");
        assert!(TestStatus::Passed.is_terminal());
        assert!(TestStatus::Failed.is_terminal());
        assert!(!TestStatus::Pending.is_terminal());
        assert!(!TestStatus::Unsettled.is_terminal());
    }

    #[test]
    fn test_reset_pending_clears_results() {
        let mut test = TestDescriptor::new("login");
        test.status = TestStatus::Failed;
        test.results.push(StepRecord {
            step: 0,
            action: "run true".to_string(),
            passed: false,
            message: None,
            duration_ms: 3,
        });
        test.finished_at = Some(Utc::now());

        test.reset_pending();

        assert_eq!(test.status, TestStatus::Pending);
        assert!(test.results.is_empty());
        assert!(test.finished_at.is_none());
    }

    #[test]
    fn test_descriptor_accepts_minimal_json() {
        let test: TestDescriptor = serde_json::from_str(r#"{"name":"checkout"}"#).unwrap();
        assert_eq!(test.name, "checkout");
        assert_eq!(test.status, TestStatus::Idle);
        assert!(test.results.is_empty());
    }

    #[test]
    fn test_test_list_encoding() {
        let names = vec!["a".to_string(), "b c".to_string()];
        let encoded = encode_test_list(&names).unwrap();
        assert_eq!(encoded, "a,b c");
        assert_eq!(decode_test_list(&encoded), names);
        assert!(decode_test_list("").is_empty());
    }

    #[test]
    fn test_test_list_rejects_commas() {
        let names = vec!["a,b".to_string()];
        assert!(encode_test_list(&names).is_err());
    }

    #[test]
    fn test_process_id_display() {
        assert_eq!(ProcessId::Scheduler.to_string(), "scheduler");
        assert_eq!(ProcessId::Worker(2).to_string(), "worker_2");
    }
}
