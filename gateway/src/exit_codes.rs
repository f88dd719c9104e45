//! Stable exit codes for gateway CLI commands.

/// Command succeeded (or the pre-flight check passed).
pub const OK: i32 = 0;
/// Request rejected before execution, or invalid configuration.
pub const INVALID: i32 = 1;
/// The build ran and failed; the diagnostic is in the printed result.
pub const FAILED: i32 = 2;
/// Interrupted by Ctrl-C; the build process was terminated.
pub const INTERRUPTED: i32 = 130;
