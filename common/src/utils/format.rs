//! Human-readable formatting helpers.

/// Formats an uptime in seconds into a short human-readable string.
///
/// Uses the largest two applicable units: `"42s"`, `"5m 3s"`, `"3h 12m"`,
/// `"1d 0h"`.
pub fn format_uptime(uptime_seconds: u64) -> String {
    if uptime_seconds < 60 {
        format!("{}s", uptime_seconds)
    } else if uptime_seconds < 3600 {
        format!("{}m {}s", uptime_seconds / 60, uptime_seconds % 60)
    } else if uptime_seconds < 86400 {
        format!("{}h {}m", uptime_seconds / 3600, (uptime_seconds % 3600) / 60)
    } else {
        format!("{}d {}h", uptime_seconds / 86400, (uptime_seconds % 86400) / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_only() {
        assert_eq!(format_uptime(0), "0s");
        assert_eq!(format_uptime(59), "59s");
    }

    #[test]
    fn test_minutes_and_seconds() {
        assert_eq!(format_uptime(60), "1m 0s");
        assert_eq!(format_uptime(303), "5m 3s");
    }

    #[test]
    fn test_hours_and_minutes() {
        assert_eq!(format_uptime(3600), "1h 0m");
        assert_eq!(format_uptime(11520), "3h 12m");
    }

    #[test]
    fn test_days_and_hours() {
        assert_eq!(format_uptime(86400), "1d 0h");
        assert_eq!(format_uptime(90000), "1d 1h");
        assert_eq!(format_uptime(86400 * 30 + 7200), "30d 2h");
    }
}
