//! Secure execution gateway for Gradle wrapper invocations.
//!
//! A caller asks for a task plus free-form flags. The gateway refuses
//! destructive tasks and any flag outside a fixed allow-list, runs the wrapper
//! while streaming its output, and on failure distills a short diagnostic from
//! the log. The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (argument policy, task
//!   classification, progress parsing, failure extraction).
//! - **[`io`]**: Side-effecting operations (configuration files, child
//!   processes, progress sinks).
//!
//! [`gateway`] combines both into the `run_task` / `run_clean` entry points.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod gateway;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::core::types::{ExecutionResult, Invocation};
pub use crate::error::GatewayError;
pub use crate::gateway::Gateway;
