//! Human-readable durations for the Markdown report.

use chrono::Duration;

/// Render a duration as e.g. "2d 4h 30m", "45m 10s", or "0s".
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.num_seconds();
    let sign = if total_seconds < 0 { "-" } else { "" };
    let total_seconds = total_seconds.abs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    if days > 0 {
        format!("{sign}{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{sign}{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{sign}{minutes}m {seconds}s")
    } else {
        format!("{sign}{seconds}s")
    }
}

/// `format_duration` lifted over absence: `None` renders as "None".
pub fn format_optional_duration(duration: Option<Duration>) -> String {
    match duration {
        Some(duration) => format_duration(duration),
        None => "None".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_magnitude() {
        assert_eq!(format_duration(Duration::zero()), "0s");
        assert_eq!(format_duration(Duration::seconds(42)), "42s");
        assert_eq!(format_duration(Duration::minutes(5) + Duration::seconds(3)), "5m 3s");
        assert_eq!(format_duration(Duration::hours(3) + Duration::minutes(7)), "3h 7m");
        assert_eq!(
            format_duration(Duration::days(2) + Duration::hours(19) + Duration::minutes(12)),
            "2d 19h 12m"
        );
    }

    #[test]
    fn negative_durations_carry_a_sign() {
        assert_eq!(format_duration(Duration::seconds(-90)), "-1m 30s");
    }

    #[test]
    fn absent_renders_as_none() {
        assert_eq!(format_optional_duration(None), "None");
    }
}
