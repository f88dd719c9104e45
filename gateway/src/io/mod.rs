//! Side-effecting parts of the gateway: configuration, child processes, sinks.

pub mod config;
pub mod process;
pub mod sink;
