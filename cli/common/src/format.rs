//! Formatting utilities for CLI output.

use std::time::Duration;

/// Format a large number with commas for readability.
///
/// # Examples
///
/// ```
/// use bp_cli_common::format_number;
///
/// assert_eq!(format_number(0), "0");
/// assert_eq!(format_number(123), "123");
/// assert_eq!(format_number(1234), "1,234");
/// assert_eq!(format_number(1234567), "1,234,567");
/// ```
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);

    for (count, c) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result.chars().rev().collect()
}

/// Format an elapsed time compactly.
///
/// # Examples
///
/// ```
/// use bp_cli_common::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_millis(2_346)), "2.35s");
/// assert_eq!(format_duration(Duration::from_secs(125)), "2m5.00s");
/// assert_eq!(format_duration(Duration::from_secs(3_725)), "1h2m5.00s");
/// ```
pub fn format_duration(elapsed: Duration) -> String {
    let total = elapsed.as_secs_f64();
    let hours = elapsed.as_secs() / 3600;
    let minutes = (elapsed.as_secs() % 3600) / 60;
    let seconds = total - (hours * 3600 + minutes * 60) as f64;

    match (hours, minutes) {
        (0, 0) => format!("{seconds:.2}s"),
        (0, m) => format!("{m}m{seconds:.2}s"),
        (h, m) => format!("{h}h{m}m{seconds:.2}s"),
    }
}

/// Format a per-second rate.
pub fn format_rate(count: u64, elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        format!("{:.1}/s", count as f64 / secs)
    } else {
        "-".to_string()
    }
}
