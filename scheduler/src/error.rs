//! Scheduler-specific error types

use shared::SharedError;
use thiserror::Error;
use webserver::WebServerError;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Failed to spawn worker for slot {slot}: {message}")]
    WorkerSpawnFailed { slot: usize, message: String },

    #[error("Results store operation failed: {operation} on {path}: {message}")]
    StoreError {
        operation: String,
        path: String,
        message: String,
    },

    #[error("Observer {client_id} is no longer listening")]
    ObserverClosed { client_id: String },

    #[error("Configuration error: {field}")]
    ConfigurationError { field: String },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("Web server error: {0}")]
    WebServerError(#[from] WebServerError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl SchedulerError {
    /// Configuration error with a free-form description
    pub fn config(field: impl Into<String>) -> Self {
        SchedulerError::ConfigurationError { field: field.into() }
    }

    /// Results store failure for `operation` on `path`
    pub fn store(operation: &str, path: &std::path::Path, error: impl std::fmt::Display) -> Self {
        SchedulerError::StoreError {
            operation: operation.to_string(),
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
