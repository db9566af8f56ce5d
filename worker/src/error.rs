//! Worker error types

use shared::SharedError;
use thiserror::Error;

/// Result type for worker operations
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Worker error types
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Test script not found: {path}")]
    ScriptNotFound { path: String },

    #[error("Invalid test script {path}: {message}")]
    ScriptInvalid { path: String, message: String },

    #[error("Failed to report result: {message}")]
    ReportFailed { message: String },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
