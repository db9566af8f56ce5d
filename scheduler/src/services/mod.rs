//! Service implementations
//!
//! Production implementations of the supervisor's collaborator traits.
//! These are the parts that perform actual I/O.

pub mod observer;
pub mod process_manager;
pub mod results_store;

#[cfg(test)]
mod tests;

pub use observer::ChannelObserver;
pub use process_manager::{default_worker_bin, RealWorkerLauncher};
pub use results_store::RealResultsStore;
