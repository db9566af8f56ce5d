//! Test worker
//!
//! Executes the recorded scripts of its assigned tests one after another
//! and reports each result as a JSON line on stdout.

pub mod error;
pub mod script;
pub mod services;
pub mod traits;
pub mod types;
pub mod worker_impl;

// Re-export main types
pub use error::{WorkerError, WorkerResult};
pub use services::{LineReporter, ScriptExecutor, StdoutReporter};
pub use traits::{Reporter, TestExecutor};
pub use types::ExecutionSettings;
pub use worker_impl::Worker;
