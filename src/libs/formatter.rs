//! Human-readable durations for terminal output.

/// Formats seconds as `MM:SS`, or `H:MM:SS` from one hour on.
///
/// ```rust
/// use restive::libs::formatter::format_seconds;
///
/// assert_eq!(format_seconds(75), "01:15");
/// assert_eq!(format_seconds(3725), "1:02:05");
/// ```
pub fn format_seconds(seconds: u64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}

/// Formats an optional duration, rendering `None` as a dash.
pub fn format_optional_seconds(seconds: Option<u64>) -> String {
    seconds.map_or_else(|| "-".to_string(), format_seconds)
}
