//! Progress percentage extraction from Gradle console lines.

use std::sync::LazyLock;

use regex::Regex;

static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)%").unwrap());

/// Return the first `N%` on the line when `N` is a valid percentage (0-100).
///
/// Matches lines such as `<=========----> 72% EXECUTING [19s]`.
pub fn parse_percent(line: &str) -> Option<u8> {
    if !line.contains('%') {
        return None;
    }
    let caps = PERCENT_RE.captures(line)?;
    let value: u32 = caps[1].parse().ok()?;
    u8::try_from(value).ok().filter(|percent| *percent <= 100)
}
