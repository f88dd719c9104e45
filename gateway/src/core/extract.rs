//! Failure diagnosis from captured Gradle output.
//!
//! Gradle splits failure evidence across both streams: per-task failure bodies
//! land on stdout while the `FAILURE:` summary and `BUILD FAILED` land on
//! stderr. The extractor joins them and returns the slice that is causally
//! part of the failure instead of the whole log.

use serde::{Deserialize, Serialize};

/// Marker vocabulary of the wrapped tool's (unversioned) console output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogVocabulary {
    /// Prefix of a per-unit status line (`> Task :app:compileJava`).
    pub unit_marker: String,
    /// Token marking a unit line as failed.
    pub failed_marker: String,
    /// Start of the failure summary section.
    pub failure_summary: Vec<String>,
    /// Terminal build-failed line.
    pub build_failed: Vec<String>,
    /// Lines that mark the start of a run or a completed earlier run.
    pub run_boundary: Vec<String>,
    /// Lines returned before a terminal marker when no failed unit is known.
    pub terminal_window: usize,
    /// Lines returned from the end when no marker is found.
    pub tail_window: usize,
}

impl Default for LogVocabulary {
    fn default() -> Self {
        Self {
            unit_marker: "> Task".to_string(),
            failed_marker: "FAILED".to_string(),
            failure_summary: vec!["FAILURE:".to_string(), "* What went wrong:".to_string()],
            build_failed: vec!["BUILD FAILED".to_string()],
            run_boundary: vec![
                "Configuration cache".to_string(),
                "BUILD SUCCESSFUL".to_string(),
            ],
            terminal_window: 100,
            tail_window: 50,
        }
    }
}

impl LogVocabulary {
    fn is_unit(&self, line: &str) -> bool {
        line.contains(&self.unit_marker)
    }

    fn is_failed_unit(&self, line: &str) -> bool {
        self.is_unit(line) && line.contains(&self.failed_marker)
    }

    fn is_failure_summary(&self, line: &str) -> bool {
        contains_any(line, &self.failure_summary)
    }

    fn is_build_failed(&self, line: &str) -> bool {
        contains_any(line, &self.build_failed)
    }

    fn is_run_boundary(&self, line: &str) -> bool {
        contains_any(line, &self.run_boundary)
    }

    /// Distill a diagnostic from the two captured streams.
    ///
    /// Windows of zero are treated as one line so a diagnostic is never empty.
    pub fn extract(&self, primary: &str, secondary: &str, fallback: &str) -> String {
        let combined = match (primary.is_empty(), secondary.is_empty()) {
            (true, true) => return fallback.to_string(),
            (false, false) => format!("{primary}\n{secondary}"),
            (false, true) => primary.to_string(),
            (true, false) => secondary.to_string(),
        };
        let trimmed = combined.trim();
        let lines: Vec<&str> = trimmed.split('\n').collect();

        let mut first_failed_unit = None;
        let mut failure_summary = None;
        let mut build_failed = None;
        for (idx, line) in lines.iter().enumerate() {
            if first_failed_unit.is_none() && self.is_failed_unit(line) {
                first_failed_unit = Some(idx);
            }
            if failure_summary.is_none() && self.is_failure_summary(line) {
                failure_summary = Some(idx);
            }
            if self.is_build_failed(line) {
                build_failed = Some(idx);
            }
        }

        if let Some(marker) = failure_summary.or(build_failed) {
            for idx in (0..marker).rev() {
                let line = lines[idx];
                if self.is_failed_unit(line) {
                    first_failed_unit = Some(idx);
                } else if self.is_unit(line) || self.is_run_boundary(line) {
                    break;
                }
            }
        }

        if let Some(start) = first_failed_unit {
            return lines[start..].join("\n");
        }
        if let Some(end) = build_failed {
            let window = self.terminal_window.max(1);
            let start = end.saturating_sub(window - 1);
            return lines[start..=end].join("\n");
        }
        let tail = self.tail_window.max(1);
        if lines.len() > tail {
            return lines[lines.len() - tail..].join("\n");
        }
        trimmed.to_string()
    }
}

fn contains_any(line: &str, markers: &[String]) -> bool {
    markers.iter().any(|marker| line.contains(marker.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradle(primary: &str, secondary: &str) -> String {
        LogVocabulary::default().extract(primary, secondary, "Task failed")
    }

    #[test]
    fn empty_output_returns_fallback() {
        assert_eq!(gradle("", ""), "Task failed");
    }

    #[test]
    fn failed_task_through_summary_is_returned() {
        let stdout = "\
> Task :app:processResources UP-TO-DATE
> Task :app:compileJava FAILED
Main.java:3: error: ';' expected";
        let stderr = "\
FAILURE: Build failed with an exception.

* What went wrong:
Execution failed for task ':app:compileJava'.

BUILD FAILED in 2s";
        let diagnostic = gradle(stdout, stderr);
        assert!(diagnostic.starts_with("> Task :app:compileJava FAILED"));
        assert!(diagnostic.contains("FAILURE: Build failed"));
        assert!(diagnostic.contains("BUILD FAILED in 2s"));
        assert!(!diagnostic.contains("processResources"));
    }

    #[test]
    fn backward_scan_finds_earliest_adjacent_failure() {
        let stdout = "\
> Task :core:compileJava
> Task :core:test FAILED
core test output
> Task :app:test FAILED
app test output";
        let stderr = "FAILURE: Build completed with 2 failures.\nBUILD FAILED in 9s";
        let diagnostic = gradle(stdout, stderr);
        assert!(diagnostic.starts_with("> Task :core:test FAILED"));
        assert!(diagnostic.contains("> Task :app:test FAILED"));
        assert!(!diagnostic.contains(":core:compileJava"));
    }

    #[test]
    fn backward_scan_stops_at_successful_task() {
        let stdout = "\
> Task :lib:test FAILED
> Task :app:compileJava
> Task :app:test FAILED
app failure body";
        let stderr = "FAILURE: Build failed with an exception.\nBUILD FAILED";
        let diagnostic = gradle(stdout, stderr);
        assert!(diagnostic.starts_with("> Task :app:test FAILED"));
        assert!(!diagnostic.contains(":lib:test"));
    }

    #[test]
    fn backward_scan_stops_at_run_boundary() {
        let stdout = "\
> Task :stale:test FAILED
BUILD SUCCESSFUL in 1s
> Task :app:test FAILED";
        let stderr = "* What went wrong:\nBUILD FAILED";
        let diagnostic = gradle(stdout, stderr);
        assert!(diagnostic.starts_with("> Task :app:test FAILED"));
        assert!(!diagnostic.contains("BUILD SUCCESSFUL"));
        assert!(diagnostic.ends_with("BUILD FAILED"));
    }

    #[test]
    fn terminal_marker_without_failed_task_returns_bounded_window() {
        let mut stdout: Vec<String> = (0..300).map(|i| format!("line {i}")).collect();
        stdout.push("BUILD FAILED in 3s".to_string());
        stdout.push("3 actionable tasks".to_string());
        let vocabulary = LogVocabulary::default();
        let diagnostic = vocabulary.extract(&stdout.join("\n"), "", "Task failed");
        let lines: Vec<&str> = diagnostic.lines().collect();
        assert_eq!(lines.len(), vocabulary.terminal_window);
        assert_eq!(lines.last(), Some(&"BUILD FAILED in 3s"));
        assert_eq!(lines.first(), Some(&"line 201"));
    }

    #[test]
    fn terminal_marker_near_start_keeps_everything_before_it() {
        let diagnostic = gradle("compile error\nBUILD FAILED", "");
        assert_eq!(diagnostic, "compile error\nBUILD FAILED");
    }

    #[test]
    fn unrecognized_output_returns_trailing_window() {
        let stdout: Vec<String> = (0..200).map(|i| format!("noise {i}")).collect();
        let diagnostic = gradle(&stdout.join("\n"), "");
        let lines: Vec<&str> = diagnostic.lines().collect();
        assert_eq!(lines.len(), 50);
        assert_eq!(lines[0], "noise 150");
        assert_eq!(lines[49], "noise 199");
    }

    #[test]
    fn short_unrecognized_output_is_returned_whole() {
        assert_eq!(gradle("  oops", "also bad"), "oops\nalso bad");
    }

    #[test]
    fn secondary_only_output_is_used() {
        let diagnostic = gradle("", "* What went wrong:\nsomething");
        assert_eq!(diagnostic, "* What went wrong:\nsomething");
    }

    #[test]
    fn custom_vocabulary_is_honored() {
        let vocabulary = LogVocabulary {
            unit_marker: "[step]".to_string(),
            failed_marker: "ERR".to_string(),
            failure_summary: vec!["summary:".to_string()],
            build_failed: vec!["run failed".to_string()],
            run_boundary: Vec::new(),
            ..LogVocabulary::default()
        };
        let diagnostic = vocabulary.extract(
            "[step] fetch ok\n[step] compile ERR\ndetails",
            "summary: 1 error\nrun failed",
            "fallback",
        );
        assert!(diagnostic.starts_with("[step] compile ERR"));
        assert!(diagnostic.ends_with("run failed"));
    }

    #[test]
    fn zero_windows_still_return_the_last_line() {
        let vocabulary = LogVocabulary {
            terminal_window: 0,
            tail_window: 0,
            ..LogVocabulary::default()
        };
        assert_eq!(
            vocabulary.extract("noise\nmore noise", "", "Task failed"),
            "more noise"
        );
        assert_eq!(
            vocabulary.extract("noise\nBUILD FAILED in 1s\nafter", "", "Task failed"),
            "BUILD FAILED in 1s"
        );
    }
}
