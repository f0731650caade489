//! Human-readable duration formatting

use chrono::Duration;

/// Format a duration as `H:MM:SS`.
///
/// Hours are not wrapped at 24. Negative durations format as `0:00:00`.
///
/// ```
/// use chrono::Duration;
/// use consinco_common::format_hms;
///
/// assert_eq!(format_hms(Duration::seconds(3725)), "1:02:05");
/// assert_eq!(format_hms(Duration::seconds(59)), "0:00:59");
/// ```
pub fn format_hms(duration: Duration) -> String {
    let total_secs = duration.num_seconds().max(0);
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(format_hms(Duration::zero()), "0:00:00");
        assert_eq!(format_hms(Duration::minutes(10)), "0:10:00");
        assert_eq!(format_hms(Duration::hours(26) + Duration::seconds(7)), "26:00:07");
    }

    #[test]
    fn drops_sub_second_precision() {
        assert_eq!(format_hms(Duration::milliseconds(61_999)), "0:01:01");
    }

    #[test]
    fn clamps_negative_durations() {
        assert_eq!(format_hms(Duration::seconds(-5)), "0:00:00");
    }
}
