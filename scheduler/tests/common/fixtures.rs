//! Test fixtures and data for scheduler tests

use shared::{StepRecord, TestDescriptor, TestStatus};
use std::collections::HashSet;

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const FIVE_TESTS: [&'static str; 5] = ["A", "B", "C", "D", "E"];

    /// Names as a request set
    pub fn names(names: &[&str]) -> HashSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    pub fn idle_tests(names: &[&str]) -> Vec<TestDescriptor> {
        names.iter().map(|name| TestDescriptor::new(*name)).collect()
    }

    /// Descriptor a worker would report for a finished test
    pub fn finished(name: &str, status: TestStatus) -> TestDescriptor {
        let passed = status == TestStatus::Passed;
        TestDescriptor {
            name: name.to_string(),
            status,
            results: vec![StepRecord {
                step: 0,
                action: "run: ./check.sh".to_string(),
                passed,
                message: (!passed).then(|| "exit status 1".to_string()),
                duration_ms: 40,
            }],
            finished_at: None,
        }
    }

    pub fn passed(name: &str) -> TestDescriptor {
        Self::finished(name, TestStatus::Passed)
    }

    pub fn failed(name: &str) -> TestDescriptor {
        Self::finished(name, TestStatus::Failed)
    }
}
