//! Classification of destructive (cleaning) task names.

use std::sync::LazyLock;

use regex::RegexSet;

static CLEANING_TASK_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([r"^clean.*", r".*clean$", r"^cleanbuild.*", r"^cleantest.*"]).unwrap()
});

/// Whether `task` is a cleaning task that must go through the clean path.
///
/// - Case-insensitive.
/// - Qualified names (`:app:cleanBuild`) are also checked by their last segment.
pub fn is_destructive(task: &str) -> bool {
    let lowered = task.to_lowercase();
    if CLEANING_TASK_PATTERNS.is_match(&lowered) {
        return true;
    }
    match lowered.rsplit_once(':') {
        Some((_, name)) => CLEANING_TASK_PATTERNS.is_match(name),
        None => false,
    }
}

/// Whether `path` can only be read by Gradle as a task path.
///
/// Rejects empty names, whitespace anywhere, and a leading `-`, which Gradle
/// would parse as a flag (`-Ievil.gradle:clean` is `-I` with a value).
pub fn is_task_path(path: &str) -> bool {
    !path.is_empty() && !path.starts_with('-') && !path.chars().any(char::is_whitespace)
}
