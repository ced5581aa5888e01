//! Small text helpers shared by embeds and the usage report.

/// Formats a duration in seconds as `1d 2h 3m 4s`, omitting leading zero units.
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if days > 0 || hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if days > 0 || hours > 0 || minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    parts.push(format!("{}s", secs));

    parts.join(" ")
}

/// Truncates `text` to at most `max` characters, appending `…` when cut.
///
/// Discord rejects embed field values above 1024 characters.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Formats an hour of day as `HH:00`.
pub fn hour_label(hour: u32) -> String {
    format!("{:02}:00", hour % 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_uptime_units() {
        assert_eq!(format_uptime(5), "5s");
        assert_eq!(format_uptime(65), "1m 5s");
        assert_eq!(format_uptime(90_061), "1d 1h 1m 1s");
    }

    #[test]
    fn truncates_long_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn wraps_hour_label() {
        assert_eq!(hour_label(7), "07:00");
        assert_eq!(hour_label(25), "01:00");
    }
}
