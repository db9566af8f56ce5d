//! File-backed results store
//!
//! Results live in `<data-dir>/results.json`. The set of known tests comes
//! from the script files in the scripts directory; the results file only
//! contributes statuses and step records for them.

use async_trait::async_trait;
use shared::{process_debug, process_warn, TestDescriptor};
use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{SchedulerError, SchedulerResult};
use crate::traits::ResultsStore;

const RESULTS_FILE: &str = "results.json";
const SCRIPT_EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct RealResultsStore {
    data_dir: PathBuf,
    scripts_dir: PathBuf,
}

impl RealResultsStore {
    pub fn new(data_dir: impl Into<PathBuf>, scripts_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            scripts_dir: scripts_dir.into(),
        }
    }

    pub fn results_path(&self) -> PathBuf {
        self.data_dir.join(RESULTS_FILE)
    }

    async fn read_results(&self) -> SchedulerResult<Vec<TestDescriptor>> {
        let path = self.results_path();
        match fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => {
                serde_json::from_str(&content).map_err(|e| SchedulerError::store("parse", &path, e))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(SchedulerError::store("read", &path, e)),
        }
    }

    /// Names of every script in the scripts directory
    async fn script_names(&self) -> SchedulerResult<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        let mut entries = match fs::read_dir(&self.scripts_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                process_warn!(
                    shared::ProcessId::current(),
                    "⚠️ Scripts directory {} does not exist",
                    self.scripts_dir.display()
                );
                return Ok(names);
            }
            Err(e) => return Err(SchedulerError::store("list", &self.scripts_dir, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SchedulerError::store("list", &self.scripts_dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SCRIPT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.insert(stem.to_string());
            }
        }
        Ok(names)
    }
}

/// Combine stored results with the tests that currently have a script
///
/// Scripts without stored results become idle tests; stored tests whose
/// script is gone are dropped. The result is ordered by name.
pub fn reconcile(stored: Vec<TestDescriptor>, scripts: &BTreeSet<String>) -> Vec<TestDescriptor> {
    let mut by_name: BTreeMap<String, TestDescriptor> = stored
        .into_iter()
        .filter(|test| scripts.contains(&test.name))
        .map(|test| (test.name.clone(), test))
        .collect();

    for name in scripts {
        by_name
            .entry(name.clone())
            .or_insert_with(|| TestDescriptor::new(name.clone()));
    }
    by_name.into_values().collect()
}

#[async_trait]
impl ResultsStore for RealResultsStore {
    async fn load(&self) -> SchedulerResult<Vec<TestDescriptor>> {
        let stored = self.read_results().await?;
        let scripts = self.script_names().await?;
        let tests = reconcile(stored, &scripts);
        process_debug!(shared::ProcessId::current(), "📂 Loaded {} known tests", tests.len());
        Ok(tests)
    }

    async fn save(&self, tests: &[TestDescriptor]) -> SchedulerResult<()> {
        let path = self.results_path();
        fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| SchedulerError::store("create", &self.data_dir, e))?;

        let content = serde_json::to_string_pretty(tests)?;
        let tmp_path = tmp_path_for(&path);
        fs::write(&tmp_path, content)
            .await
            .map_err(|e| SchedulerError::store("write", &tmp_path, e))?;
        fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| SchedulerError::store("rename", &path, e))?;

        process_debug!(shared::ProcessId::current(), "💾 Saved {} tests to {}", tests.len(), path.display());
        Ok(())
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
