//! Time formatting helpers

use std::time::Duration;

/// Format a limit as a human-readable string ("1 hour", "30 minutes").
///
/// Whole hours and minutes use words; anything finer falls back to
/// seconds or milliseconds.
pub fn format_limit(limit: Duration) -> String {
    let total_seconds = limit.as_secs();

    if limit.subsec_nanos() != 0 || total_seconds == 0 {
        return format!("{}ms", limit.as_millis());
    }

    if total_seconds % 3600 == 0 {
        plural(total_seconds / 3600, "hour")
    } else if total_seconds % 60 == 0 {
        plural(total_seconds / 60, "minute")
    } else {
        plural(total_seconds, "second")
    }
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}
