//! Core business logic modules
//!
//! Deterministic building blocks of the run supervisor: the test catalog,
//! work partitioning, per-worker handles and the state of the active run.
//! Nothing here performs I/O.

pub mod catalog;
pub mod partition;
pub mod run_state;
pub mod worker_handle;

pub use catalog::TestCatalog;
pub use partition::{effective_worker_count, round_robin};
pub use run_state::{RunCompletion, RunOutcome, RunState};
pub use worker_handle::{WorkerAssignment, WorkerEvent, WorkerEventKind, WorkerHandle};
