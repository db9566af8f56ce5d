//! Shared types for the test distribution system
//!
//! Contains only the types that cross a process boundary: test descriptors,
//! the worker result stream, and the observer request/update protocol.
//! Component-internal types stay in their respective crates.

pub mod errors;
pub mod logging;
pub mod messages;
pub mod types;

pub use errors::*;
pub use types::*;

pub use messages::{ObserverRequest, ObserverUpdate, WorkerMessage};
