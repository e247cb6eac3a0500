//! Wall-clock capture and duration formatting helpers.
//!
//! The backend serializes times of day as zero-padded `HH:MM:SS`
//! (24-hour) strings; everything here stays at whole-second precision.

use chrono::{Local, NaiveTime, Timelike};

/// Current local wall-clock time, truncated to whole seconds so it
/// serializes as `HH:MM:SS` with no fractional part.
pub fn wall_clock_now() -> NaiveTime {
    let now = Local::now().time();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Format a time of day as zero-padded `HH:MM:SS`.
pub fn hms(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// Render a finished work session as whole hours and remaining minutes,
/// e.g. `"2h 30m"`.
///
/// Both times are same-day wall-clock values; an end before the start
/// is not renderable (`None`) rather than negative or clamped.
pub fn elapsed_label(start: NaiveTime, end: NaiveTime) -> Option<String> {
    let elapsed = end.signed_duration_since(start);
    if elapsed < chrono::Duration::zero() {
        return None;
    }
    Some(format!(
        "{}h {}m",
        elapsed.num_hours(),
        elapsed.num_minutes() % 60
    ))
}
