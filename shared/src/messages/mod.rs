//! Message types for the test distribution system
//!
//! - `worker`: Worker process → Scheduler result stream
//! - `observer`: Observer ↔ Scheduler run control and progress updates

pub mod observer;
pub mod worker;

pub use observer::{ObserverRequest, ObserverUpdate};
pub use worker::WorkerMessage;
