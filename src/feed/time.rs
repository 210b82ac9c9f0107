use chrono::{DateTime, NaiveDateTime, Utc};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Turns a gateway `created_at` into the display string shown next to a post
/// or comment. Unparseable input is shown as-is.
pub fn parse_and_format_time(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| format_relative_time(&dt))
        .unwrap_or_else(|| raw.to_string())
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

pub fn format_relative_time(dt: &NaiveDateTime) -> String {
    format_relative_time_at(dt, &Utc::now().naive_utc())
}

pub fn format_relative_time_at(dt: &NaiveDateTime, now: &NaiveDateTime) -> String {
    let diff = now.signed_duration_since(*dt);

    if diff.num_seconds() < 60 {
        return "just now".to_string();
    }

    let minutes = diff.num_minutes();
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }

    let hours = diff.num_hours();
    if hours < 24 {
        return format!("{}h ago", hours);
    }

    let days = diff.num_days();
    if days < 7 {
        return format!("{}d ago", days);
    }

    dt.format("%b %-d, %Y").to_string()
}
