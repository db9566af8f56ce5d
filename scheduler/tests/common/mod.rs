//! Common test utilities and infrastructure
//!
//! Shared fixtures, in-memory fakes and a builder used across the
//! scheduler test suites.

#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use helpers::{FakeLauncher, Harness, MemoryStore, RecordingObserver, SupervisorBuilder};
