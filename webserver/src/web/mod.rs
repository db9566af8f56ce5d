//! HTTP surface of the observer channel

pub mod handlers;
