//! Human readable uptime strings.

/// Shown while a duration is not known yet
pub const LOADING_TEXT: &str = "loading";
/// Shown for durations above zero but under a minute
pub const LESS_THAN_A_MINUTE: &str = "<1m";

const SECONDS_IN_MINUTE: u64 = 60;
const SECONDS_IN_HOUR: u64 = 3600;
const SECONDS_IN_DAY: u64 = 24 * SECONDS_IN_HOUR;
/// No leap-year adjustment
const SECONDS_IN_YEAR: u64 = 365 * SECONDS_IN_DAY;

/// Which ladder to format with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationMode {
    /// days/hours/minutes, collapsing to whole days from 100 days on
    #[default]
    Default,
    /// years/days once a full year has accumulated
    Cumulative,
}

/// Format a number of seconds.
///
/// `None` yields [`LOADING_TEXT`]. Negative and non-finite values are treated
/// as zero; fractions are dropped.
///
/// ```
/// use lantern_client::domain::{format_duration, DurationMode};
///
/// assert_eq!(format_duration(Some(3661.0), DurationMode::Default), "1h 1m");
/// assert_eq!(format_duration(Some(400.0 * 86400.0), DurationMode::Cumulative), "1y 35d");
/// ```
pub fn format_duration(total_seconds: Option<f64>, mode: DurationMode) -> String {
    let Some(raw) = total_seconds else {
        return LOADING_TEXT.to_string();
    };
    let seconds = if raw.is_finite() && raw > 0.0 {
        raw.floor() as u64
    } else {
        0
    };

    if mode == DurationMode::Cumulative && seconds >= SECONDS_IN_YEAR {
        let years = seconds / SECONDS_IN_YEAR;
        let days = (seconds % SECONDS_IN_YEAR) / SECONDS_IN_DAY;
        return format!("{}y {}d", years, days);
    }

    let days = seconds / SECONDS_IN_DAY;
    let hours = (seconds % SECONDS_IN_DAY) / SECONDS_IN_HOUR;
    let minutes = (seconds % SECONDS_IN_HOUR) / SECONDS_IN_MINUTE;

    if days >= 100 {
        format!("{}d", days)
    } else if days >= 1 {
        format!("{}d {}h", days, hours)
    } else if hours >= 1 {
        format!("{}h {}m", hours, minutes)
    } else if seconds > 0 && seconds < SECONDS_IN_MINUTE {
        LESS_THAN_A_MINUTE.to_string()
    } else {
        format!("{}m", minutes)
    }
}

/// Convenience for whole-second counters
pub fn format_seconds(total_seconds: Option<u64>, mode: DurationMode) -> String {
    format_duration(total_seconds.map(|s| s as f64), mode)
}
