//! Test run scheduler
//!
//! Distributes a requested subset of named tests over worker processes,
//! merges the results they stream back into the results store and keeps
//! observers informed. The supervisor is generic over its collaborators
//! (see [`traits`]) so every piece can be exercised with mocks.

pub mod cancellation;
pub mod coordinator;
pub mod core;
pub mod error;
pub mod services;
pub mod supervisor;
pub mod traits;

pub use coordinator::{publish_summary_when_done, Coordinator};
pub use error::{SchedulerError, SchedulerResult};
pub use supervisor::Supervisor;
pub use traits::{Observer, ResultsStore, WorkerLauncher};
