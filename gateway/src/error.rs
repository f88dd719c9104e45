//! Errors surfaced before a build process is started.
//!
//! Failures of the build itself are not errors: they come back as an
//! [`ExecutionResult`](crate::core::types::ExecutionResult) with a diagnostic.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Why an argument was refused by the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// The flag grants code execution or arbitrary filesystem access.
    Dangerous,
    /// The flag is not on the allow-list. `allowed` lists the accepted flags.
    NotAllowed { allowed: String },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::Dangerous => f.write_str(
                "is not allowed due to security concerns. \
                 It could enable arbitrary code execution or unauthorized file access.",
            ),
            RejectionReason::NotAllowed { allowed } => write!(
                f,
                "is not in the allow-list of safe Gradle arguments. Allowed arguments are: {allowed}"
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Argument '{argument}' {reason}")]
    RejectedArgument {
        argument: String,
        reason: RejectionReason,
    },

    #[error(
        "Task '{task}' is a cleaning task and cannot be run via run_task. \
         Please use the clean operation instead."
    )]
    DisallowedTask { task: String },

    #[error(
        "Task '{task}' is not a valid Gradle task path. \
         Task paths must be non-empty, contain no whitespace and not start with '-'."
    )]
    InvalidTaskPath { task: String },

    #[error("Gradle wrapper not found at {}", path.display())]
    WrapperNotFound { path: PathBuf },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GatewayError {
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            GatewayError::RejectedArgument { .. }
                | GatewayError::DisallowedTask { .. }
                | GatewayError::InvalidTaskPath { .. }
        )
    }
}
