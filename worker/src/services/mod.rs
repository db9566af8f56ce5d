//! Service implementations for the worker

pub mod script_executor;
pub mod stdout_reporter;

#[cfg(test)]
mod tests;

pub use script_executor::ScriptExecutor;
pub use stdout_reporter::{LineReporter, StdoutReporter};
