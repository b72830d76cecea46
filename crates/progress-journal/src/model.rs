//! Journal records as they travel to and from the API.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// The fixed set of performance tiers an observation can be rated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerformanceRating {
    Low,
    Mid,
    High,
}

impl PerformanceRating {
    pub const ALL: [PerformanceRating; 3] = [
        PerformanceRating::Low,
        PerformanceRating::Mid,
        PerformanceRating::High,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PerformanceRating::Low => "Low",
            PerformanceRating::Mid => "Mid",
            PerformanceRating::High => "High",
        }
    }

    /// Classifies a label coming back from the server. Unknown labels yield `None`.
    pub fn classify(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Some(PerformanceRating::Low),
            "mid" | "medium" | "middle" => Some(PerformanceRating::Mid),
            "high" => Some(PerformanceRating::High),
            _ => None,
        }
    }
}

impl fmt::Display for PerformanceRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PerformanceRating {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::classify(s).ok_or_else(|| ValidationError::UnknownRating(s.to_string()))
    }
}

/// A stored entry returned by a history query.
///
/// Every field tolerates being absent or typed as a number/bool, since the
/// rows come straight out of a spreadsheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    #[serde(default, deserialize_with = "loose_string")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub site: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub staff_role: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub staff_pin: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub scholar_id: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub skill_area: String,
    #[serde(default, deserialize_with = "loose_opt_string")]
    pub specific_skill_target: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub evidence_type: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub performance_rating: String,
    #[serde(default, deserialize_with = "loose_opt_string")]
    pub optional_note: Option<String>,
    #[serde(default, deserialize_with = "loose_opt_string")]
    pub evidence_image_url: Option<String>,
}

impl JournalEntry {
    /// Parses `timestamp`. Accepts RFC 3339 and offset-less ISO-8601 (read as UTC).
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }

    pub fn rating(&self) -> Option<PerformanceRating> {
        PerformanceRating::classify(&self.performance_rating)
    }
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// Image attached to a submission, already base64-encoded as a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub data_url: String,
    pub filename: String,
    pub mime_type: String,
}

/// A new entry as built by the form, before the shared key is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub site: String,
    pub staff_role: String,
    pub staff_pin: String,
    pub scholar_id: String,
    pub skill_area: String,
    pub specific_skill_target: String,
    pub evidence_type: String,
    pub performance_rating: PerformanceRating,
    pub optional_note: String,
    pub image: Option<ImagePayload>,
}

/// Selects which history the API should return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryQuery {
    ByPin { site: String, staff_pin: String },
    ByScholar { site: String, scholar_id: String },
}

impl HistoryQuery {
    /// Value of the `path` query parameter.
    pub fn path(&self) -> &'static str {
        match self {
            HistoryQuery::ByPin { .. } => "history",
            HistoryQuery::ByScholar { .. } => "scholarHistory",
        }
    }

    pub fn site(&self) -> &str {
        match self {
            HistoryQuery::ByPin { site, .. } | HistoryQuery::ByScholar { site, .. } => site,
        }
    }
}

fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_opt_string(deserializer)?.unwrap_or_default())
}

fn loose_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let text = match value {
        serde_json::Value::Null => return Ok(None),
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    };
    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}
