#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};

use progress_journal::model::JournalEntry;

/// The fixed "now" used across integration tests.
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 15, 15, 0, 0).unwrap()
}

/// A fully populated entry recorded `days_ago` days before [`test_now`].
pub fn entry_days_ago(scholar_id: &str, days_ago: i64) -> JournalEntry {
    JournalEntry {
        timestamp: (test_now() - Duration::days(days_ago)).to_rfc3339(),
        site: "Newark".to_string(),
        staff_role: "Tutor".to_string(),
        staff_pin: "4471".to_string(),
        scholar_id: scholar_id.to_string(),
        skill_area: "Reading".to_string(),
        specific_skill_target: Some("Decoding".to_string()),
        evidence_type: "Observation".to_string(),
        performance_rating: "High".to_string(),
        optional_note: Some("Read aloud, then summarized".to_string()),
        evidence_image_url: None,
    }
}

/// A JPEG-typed payload of `len` bytes. Content is irrelevant to validation.
pub fn jpeg_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    if len >= 3 {
        bytes[..3].copy_from_slice(&[0xFF, 0xD8, 0xFF]);
    }
    bytes
}
