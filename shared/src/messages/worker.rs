//! Worker → Scheduler messages
//!
//! A worker writes one JSON document per line on its stdout. The scheduler
//! treats any other output on that stream as noise.

use serde::{Deserialize, Serialize};

use crate::errors::{SharedError, SharedResult};
use crate::types::TestDescriptor;

/// Structured message emitted by a worker process
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerMessage {
    /// One assigned test finished with a final status and its results
    TestCompleted { test: TestDescriptor },
}

impl WorkerMessage {
    /// Encode as a single line (without the trailing newline)
    pub fn to_line(&self) -> SharedResult<String> {
        serde_json::to_string(self).map_err(|e| SharedError::SerializationError {
            message: e.to_string(),
        })
    }

    /// Decode one line of worker output
    pub fn from_line(line: &str) -> SharedResult<Self> {
        serde_json::from_str(line.trim()).map_err(|e| SharedError::DeserializationError {
            message: e.to_string(),
        })
    }
}
