//! Shared deterministic types for the gateway.
//!
//! These types define the contracts between the gates, the streamer and the
//! caller. They hold no I/O handles.

use serde::{Deserialize, Serialize};

/// Which execution path produced an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationKind {
    /// General task runner, gated by the classifier and argument policy.
    Task,
    /// Explicit clean path.
    Clean,
}

impl InvocationKind {
    /// Diagnostic used when a failed run produced no output at all.
    pub fn fallback_message(self) -> &'static str {
        match self {
            InvocationKind::Task => "Task failed",
            InvocationKind::Clean => "Clean failed",
        }
    }
}

/// A single request to execute a task with a specific argument set.
///
/// Constructed only by the gateway after the pre-flight gates (or by the clean
/// path), and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    kind: InvocationKind,
    task: String,
    extra_args: Vec<String>,
}

impl Invocation {
    pub(crate) fn new(kind: InvocationKind, task: String, extra_args: Vec<String>) -> Self {
        Self {
            kind,
            task,
            extra_args,
        }
    }

    pub fn kind(&self) -> InvocationKind {
        self.kind
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    /// Caller-supplied flags, excluding the cache-bypass flag.
    pub fn extra_args(&self) -> &[String] {
        &self.extra_args
    }

    /// Arguments passed to the executable: task, cache-bypass flag, extra args.
    pub fn command_args(&self, cache_bypass_flag: &str) -> Vec<String> {
        let mut args = Vec::with_capacity(self.extra_args.len() + 2);
        args.push(self.task.clone());
        args.push(cache_bypass_flag.to_string());
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// Outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub diagnostic: Option<String>,
}

impl ExecutionResult {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            diagnostic: None,
        }
    }

    pub fn failed(diagnostic: impl Into<String>) -> Self {
        Self {
            success: false,
            diagnostic: Some(diagnostic.into()),
        }
    }
}

/// Output stream a line was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Child stdout.
    Primary,
    /// Child stderr.
    Secondary,
}

/// One line of child output, alive only between the reader and the merge loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    pub channel: Channel,
    pub text: String,
    /// Percentage found on a primary-channel line.
    pub progress: Option<u8>,
}
