//! Deterministic, pure logic behind the gateway gates and diagnosis.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data and return deterministic outputs suitable for tests.

pub mod args;
pub mod classifier;
pub mod extract;
pub mod progress;
pub mod types;
