//! Formatting helpers shared by the report outputs.

use chrono::{DateTime, NaiveDate, Utc};

use crate::analytics::TimeFrame;

/// Chart label for the bucket starting on `start` (e.g., "Mar 4", "Mar 2024").
pub fn format_bucket_label(start: NaiveDate, frame: TimeFrame) -> String {
    match frame {
        TimeFrame::Daily | TimeFrame::Weekly => start.format("%b %-d").to_string(),
        TimeFrame::Monthly => start.format("%b %Y").to_string(),
    }
}

/// Format a date range for a report header (e.g., "Mar 4, 2024 - Mar 31, 2024").
pub fn format_date_range(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} - {}", start.format("%b %-d, %Y"), end.format("%b %-d, %Y"))
}

/// Format a count for display (e.g., "14.2K", "3.1M").
pub fn format_count(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

/// Format a 0-100 rate with two decimals (e.g., "42.50%").
pub fn format_rate(rate: f64) -> String {
    format!("{:.2}%", rate)
}

/// Format a timestamp relative to `now` (e.g., "2d ago").
pub fn format_relative_time(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(ts);

    if duration.num_seconds() < 0 {
        "just now".to_string()
    } else if duration.num_seconds() < 60 {
        format!("{}s ago", duration.num_seconds())
    } else if duration.num_minutes() < 60 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_days() < 7 {
        format!("{}d ago", duration.num_days())
    } else {
        ts.format("%b %d").to_string()
    }
}

/// Format an optional timestamp relative to `now`, or "never" if missing.
pub fn format_relative_time_opt(ts: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match ts {
        Some(ts) => format_relative_time(ts, now),
        None => "never".to_string(),
    }
}
