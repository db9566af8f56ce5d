//! Recorded test scripts
//!
//! A test named `checkout` is the file `<scripts-dir>/checkout.json`:
//!
//! ```json
//! {"steps":[{"action":"run","command":"./open.sh"},{"action":"wait","ms":250}]}
//! ```

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{WorkerError, WorkerResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestScript {
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ScriptStep {
    /// Shell command; passes on exit status 0
    Run { command: String },
    /// Pause, scaled by the replay speed
    Wait { ms: u64 },
}

impl ScriptStep {
    /// Short human readable form used in step records
    pub fn describe(&self) -> String {
        match self {
            ScriptStep::Run { command } => format!("run: {command}"),
            ScriptStep::Wait { ms } => format!("wait: {ms}ms"),
        }
    }
}

pub fn script_path(scripts_dir: &Path, name: &str) -> PathBuf {
    scripts_dir.join(format!("{name}.json"))
}

impl TestScript {
    pub fn parse(content: &str, path: &Path) -> WorkerResult<Self> {
        serde_json::from_str(content).map_err(|e| WorkerError::ScriptInvalid {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub async fn load(path: &Path) -> WorkerResult<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => WorkerError::ScriptNotFound {
                path: path.display().to_string(),
            },
            _ => WorkerError::IoError(e),
        })?;
        Self::parse(&content, path)
    }
}
