use chrono::{DateTime, Datelike, FixedOffset, Utc};

/// Human-friendly age of an entry.
///
/// Buckets are by elapsed time: under a minute, under an hour, under a day,
/// one day, under a week, then an absolute short date (year only when it
/// differs from `now`'s year). Instants in the future count as "Just now".
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>, offset: &FixedOffset) -> String {
    let elapsed = if at > now { chrono::Duration::zero() } else { now - at };
    let days = elapsed.num_days();

    match days {
        0 => {
            let hours = elapsed.num_hours();
            if hours > 0 {
                return format!("{}h ago", hours);
            }
            match elapsed.num_minutes() {
                0 => "Just now".to_string(),
                minutes => format!("{}m ago", minutes),
            }
        }
        1 => "Yesterday".to_string(),
        2..=6 => format!("{}d ago", days),
        _ => short_date(at, now, offset),
    }
}

/// `Oct 3`, or `Oct 3, 2025` outside the current year.
pub fn short_date(at: DateTime<Utc>, now: DateTime<Utc>, offset: &FixedOffset) -> String {
    let local = at.with_timezone(offset);
    if local.year() == now.with_timezone(offset).year() {
        local.format("%b %-d").to_string()
    } else {
        local.format("%b %-d, %Y").to_string()
    }
}

/// Absolute timestamp used in exports: `10/14/2026, 9:30:00 AM`.
pub fn export_timestamp(at: DateTime<Utc>, offset: &FixedOffset) -> String {
    at.with_timezone(offset)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}
