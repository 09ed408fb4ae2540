//! Job notification publisher over Redis Streams.
//!
//! This crate provides:
//! - A single process-wide bus connection with explicit connect/close
//! - Fire-and-forget event publication (at-least-once, no retry)
//! - Fail-fast publishing while disconnected

pub mod error;
pub mod publisher;

pub use error::{BusError, BusResult};
pub use publisher::{BusConfig, EventPublisher};
