//! In-memory catalog of known tests
//!
//! The scheduler's canonical copy of the results store. Workers never touch
//! it; their results arrive by value and are merged here.

use chrono::Utc;
use shared::{TestDescriptor, TestStatus};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct TestCatalog {
    tests: Vec<TestDescriptor>,
}

impl TestCatalog {
    pub fn new(tests: Vec<TestDescriptor>) -> Self {
        Self { tests }
    }

    /// Take the set and order of tests from a freshly loaded list
    ///
    /// Tests already in the catalog keep their in-memory state, which may be
    /// ahead of a store whose last save failed. Only new names are taken
    /// from `loaded`; names missing from it are dropped.
    pub fn reconcile(&mut self, loaded: Vec<TestDescriptor>) {
        let mut known: HashMap<String, TestDescriptor> = self
            .tests
            .drain(..)
            .map(|test| (test.name.clone(), test))
            .collect();
        self.tests = loaded
            .into_iter()
            .map(|test| known.remove(&test.name).unwrap_or(test))
            .collect();
    }

    pub fn tests(&self) -> &[TestDescriptor] {
        &self.tests
    }

    pub fn get(&self, name: &str) -> Option<&TestDescriptor> {
        self.tests.iter().find(|test| test.name == name)
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Full copy of every known test, for publishing
    pub fn snapshot(&self) -> Vec<TestDescriptor> {
        self.tests.clone()
    }

    /// Reset the requested tests to pending and return their names
    ///
    /// Names are returned in catalog order. Requested names the catalog does
    /// not know are ignored.
    pub fn select_for_run(&mut self, requested: &HashSet<String>) -> Vec<String> {
        let mut selected = Vec::new();
        for test in self.tests.iter_mut().filter(|test| requested.contains(&test.name)) {
            test.reset_pending();
            selected.push(test.name.clone());
        }
        selected
    }

    /// Merge one worker result into the catalog
    ///
    /// Only a test that is still pending accepts a result, so a repeated
    /// report for the same test is a no-op. Returns whether anything changed.
    pub fn merge(&mut self, update: TestDescriptor) -> bool {
        let Some(test) = self.tests.iter_mut().find(|test| test.name == update.name) else {
            return false;
        };
        if test.status != TestStatus::Pending {
            return false;
        }

        test.status = update.status;
        test.results.extend(update.results);
        test.finished_at = update.finished_at.or_else(|| Some(Utc::now()));
        true
    }

    /// Move every still-pending test among `names` to unsettled
    pub fn mark_unsettled(&mut self, names: &[String]) -> usize {
        let names: HashSet<&str> = names.iter().map(String::as_str).collect();
        let mut changed = 0;
        for test in self
            .tests
            .iter_mut()
            .filter(|test| test.status == TestStatus::Pending && names.contains(test.name.as_str()))
        {
            test.status = TestStatus::Unsettled;
            changed += 1;
        }
        changed
    }
}
