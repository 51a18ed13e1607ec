use chrono::Duration;

/// This is the standard way of printing a duration in mierukun, e.g. `1h2m3s`, `2m3s` or `3s`.
/// Negative durations keep their sign so broken timestamps stay visible.
pub fn format_duration(v: Duration) -> String {
    if v < Duration::zero() {
        return format!("-{}", format_duration(-v));
    }
    if v.num_hours() > 0 {
        format!(
            "{}h{}m{}s",
            v.num_hours(),
            v.num_minutes() % 60,
            v.num_seconds() % 60
        )
    } else if v.num_minutes() > 0 {
        format!("{}m{}s", v.num_minutes() % 60, v.num_seconds() % 60)
    } else {
        format!("{}s", v.num_seconds() % 60)
    }
}
