//! Allow-list validation of caller-supplied Gradle flags.
//!
//! This is the only barrier between caller input and the spawned process, so
//! it is deny-by-default: a flag that is not explicitly safe is rejected, even
//! if it is not known to be dangerous.

use tracing::warn;

use crate::error::{GatewayError, RejectionReason};

const GRADLE_SAFE_ARGS: &[&str] = &[
    // Logging
    "--debug",
    "-d",
    "--info",
    "-i",
    "--warn",
    "-w",
    "--quiet",
    "-q",
    "--stacktrace",
    "-s",
    "--full-stacktrace",
    "-S",
    "--scan",
    "--no-scan",
    // Performance
    "--build-cache",
    "--no-build-cache",
    "--configure-on-demand",
    "--no-configure-on-demand",
    "--max-workers",
    "--parallel",
    "--no-parallel",
    // Execution
    "--continue",
    "--dry-run",
    "-m",
    "--refresh-dependencies",
    "--rerun-tasks",
    "--profile",
    // Task exclusion only narrows what runs
    "-x",
    "--exclude-task",
    // Daemon
    "--daemon",
    "--no-daemon",
    "--foreground",
    "--stop",
    "--status",
];

/// Flags that load code, inject properties or point Gradle at arbitrary paths.
const GRADLE_DANGEROUS_ARGS: &[&str] = &[
    "--init-script",
    "-I",
    "--project-prop",
    "-P",
    "--system-prop",
    "-D",
    "--settings-file",
    "-c",
    "--build-file",
    "-b",
    "--gradle-user-home",
    "-g",
    "--project-dir",
    "-p",
    "--include-build",
    "--write-verification-metadata",
];

const GRADLE_VALUE_TAKING_ARGS: &[&str] = &["--max-workers", "-x", "--exclude-task"];

/// Static policy tables partitioning flags into safe and dangerous.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentPolicy {
    safe: &'static [&'static str],
    dangerous: &'static [&'static str],
    value_taking: &'static [&'static str],
}

impl ArgumentPolicy {
    pub const fn gradle() -> Self {
        Self {
            safe: GRADLE_SAFE_ARGS,
            dangerous: GRADLE_DANGEROUS_ARGS,
            value_taking: GRADLE_VALUE_TAKING_ARGS,
        }
    }

    pub fn safe(&self) -> &'static [&'static str] {
        self.safe
    }

    pub fn dangerous(&self) -> &'static [&'static str] {
        self.dangerous
    }

    /// Validate `args` in one left-to-right scan, failing on the first violation.
    pub fn validate<S: AsRef<str>>(&self, args: &[S]) -> Result<(), GatewayError> {
        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_ref();

            if self.is_dangerous(arg) {
                warn!(argument = arg, "rejected dangerous argument");
                return Err(GatewayError::RejectedArgument {
                    argument: arg.to_string(),
                    reason: RejectionReason::Dangerous,
                });
            }

            if self.safe.contains(&arg) {
                if self.value_taking.contains(&arg)
                    && args
                        .get(i + 1)
                        .is_some_and(|next| !next.as_ref().starts_with('-'))
                {
                    i += 1;
                }
                i += 1;
                continue;
            }

            if let Some((base, _)) = arg.split_once('=')
                && self.safe.contains(&base)
            {
                i += 1;
                continue;
            }

            warn!(argument = arg, "rejected unknown argument");
            return Err(GatewayError::RejectedArgument {
                argument: arg.to_string(),
                reason: RejectionReason::NotAllowed {
                    allowed: self.allowed_list(),
                },
            });
        }
        Ok(())
    }

    /// Exact match, `--flag=value`, or attached `-Xvalue` for short flags.
    fn is_dangerous(&self, arg: &str) -> bool {
        self.dangerous.iter().any(|flag| {
            if arg == *flag {
                return true;
            }
            match arg.strip_prefix(flag) {
                Some(rest) => rest.starts_with('=') || (flag.len() == 2 && !rest.is_empty()),
                None => false,
            }
        })
    }

    fn allowed_list(&self) -> String {
        let mut allowed = self.safe.to_vec();
        allowed.sort_unstable();
        allowed.join(", ")
    }
}
