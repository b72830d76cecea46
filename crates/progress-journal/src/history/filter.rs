use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use crate::model::JournalEntry;

/// Client-side recency window for the scholar view. The cutoff is computed
/// from the `now` passed at render time, never at fetch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecencyFilter {
    LastDays(u32),
    AllTime,
}

impl Default for RecencyFilter {
    fn default() -> Self {
        RecencyFilter::LastDays(7)
    }
}

impl RecencyFilter {
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            RecencyFilter::LastDays(days) => Some(now - Duration::days(i64::from(*days))),
            RecencyFilter::AllTime => None,
        }
    }

    /// Entries with an unreadable timestamp only pass the all-time filter.
    pub fn admits(&self, entry: &JournalEntry, now: DateTime<Utc>) -> bool {
        match self.cutoff(now) {
            None => true,
            Some(cutoff) => entry.recorded_at().is_some_and(|at| at >= cutoff),
        }
    }
}

impl fmt::Display for RecencyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecencyFilter::LastDays(days) => write!(f, "{}d", days),
            RecencyFilter::AllTime => f.write_str("all"),
        }
    }
}

impl FromStr for RecencyFilter {
    type Err = String;

    /// Accepts `all`, `7`, or `7d`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s == "all" {
            return Ok(RecencyFilter::AllTime);
        }
        let digits = s.strip_suffix('d').unwrap_or(&s);
        match digits.parse::<u32>() {
            Ok(days) if days > 0 => Ok(RecencyFilter::LastDays(days)),
            _ => Err(format!("expected 'all' or a day count like '7d', got '{}'", s)),
        }
    }
}
