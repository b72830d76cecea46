//! Pure transformations from entries to display cards and CSV text.

pub mod card;
pub mod csv;
pub mod date;

use chrono::{DateTime, FixedOffset, Local, Utc};

use crate::model::JournalEntry;

pub use card::{DetailRow, EntryCard, RatingBadge};
pub use csv::CSV_HEADERS;

#[derive(Debug, Clone, Copy)]
pub struct EntryRenderer {
    offset: FixedOffset,
}

impl EntryRenderer {
    /// Renders absolute dates in the given fixed offset.
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Uses the machine's current UTC offset.
    pub fn local() -> Self {
        Self::new(*Local::now().offset())
    }

    pub fn with_offset(offset: Option<FixedOffset>) -> Self {
        offset.map(Self::new).unwrap_or_else(Self::local)
    }

    pub fn offset(&self) -> &FixedOffset {
        &self.offset
    }

    pub fn relative_time(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> String {
        date::relative_time(at, now, &self.offset)
    }

    /// Builds the display card. `show_staff` puts role and PIN in the header
    /// (shared history); otherwise the role moves into the details as
    /// "Submitted By" (scholar history).
    pub fn card(&self, entry: &JournalEntry, show_staff: bool, now: DateTime<Utc>) -> EntryCard {
        let when = match entry.recorded_at() {
            Some(at) => self.relative_time(at, now),
            None if entry.timestamp.trim().is_empty() => "Unknown date".to_string(),
            None => entry.timestamp.clone(),
        };

        let staff_line = show_staff.then(|| {
            if entry.staff_pin.is_empty() {
                entry.staff_role.clone()
            } else {
                format!("{} | PIN: {}", entry.staff_role, entry.staff_pin)
            }
        });

        let mut details = Vec::new();
        if let Some(target) = &entry.specific_skill_target {
            details.push(DetailRow {
                label: "Specific Target",
                value: target.clone(),
            });
        }
        details.push(DetailRow {
            label: "Evidence Type",
            value: entry.evidence_type.clone(),
        });
        if let Some(note) = &entry.optional_note {
            details.push(DetailRow {
                label: "Session Notes",
                value: note.clone(),
            });
        }
        if !show_staff && !entry.staff_role.is_empty() {
            details.push(DetailRow {
                label: "Submitted By",
                value: entry.staff_role.clone(),
            });
        }

        EntryCard {
            title: format!("Scholar {}", entry.scholar_id),
            skill_area: entry.skill_area.clone(),
            staff_line,
            rating: RatingBadge::from_label(&entry.performance_rating),
            when,
            details,
            image_url: entry.evidence_image_url.clone(),
        }
    }

    /// Absolute timestamp for exports; unparseable values pass through untouched.
    pub fn export_timestamp(&self, raw: &str) -> String {
        match crate::model::parse_timestamp(raw) {
            Some(at) => date::export_timestamp(at, &self.offset),
            None => raw.to_string(),
        }
    }

    /// Header plus one quoted row per entry, newline-joined.
    ///
    /// An empty slice yields a header-only document; callers are expected to
    /// refuse exporting nothing before getting here.
    pub fn to_csv(&self, entries: &[JournalEntry]) -> String {
        let mut lines = Vec::with_capacity(entries.len() + 1);
        lines.push(csv::header_line());

        for entry in entries {
            let timestamp = self.export_timestamp(&entry.timestamp);
            lines.push(csv::row_line(&[
                timestamp.as_str(),
                entry.site.as_str(),
                entry.staff_role.as_str(),
                entry.staff_pin.as_str(),
                entry.scholar_id.as_str(),
                entry.skill_area.as_str(),
                entry.specific_skill_target.as_deref().unwrap_or(""),
                entry.evidence_type.as_str(),
                entry.performance_rating.as_str(),
                entry.optional_note.as_deref().unwrap_or(""),
                entry.evidence_image_url.as_deref().unwrap_or(""),
            ]));
        }

        lines.join("\n")
    }
}

impl Default for EntryRenderer {
    fn default() -> Self {
        Self::local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PerformanceRating;
    use chrono::TimeZone;

    fn renderer() -> EntryRenderer {
        EntryRenderer::new(FixedOffset::east_opt(0).unwrap())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 15, 0, 0).unwrap()
    }

    fn sample() -> JournalEntry {
        JournalEntry {
            timestamp: "2026-10-15T13:00:00.000Z".into(),
            site: "Newark".into(),
            staff_role: "Tutor".into(),
            staff_pin: "4471".into(),
            scholar_id: "S-1023".into(),
            skill_area: "Reading".into(),
            specific_skill_target: Some("Decoding, CVC words".into()),
            evidence_type: "Observation".into(),
            performance_rating: "High".into(),
            optional_note: None,
            evidence_image_url: None,
        }
    }

    #[test]
    fn test_card_with_staff_info() {
        let card = renderer().card(&sample(), true, now());

        assert_eq!(card.title, "Scholar S-1023");
        assert_eq!(card.staff_line.as_deref(), Some("Tutor | PIN: 4471"));
        assert_eq!(card.rating, RatingBadge::Known(PerformanceRating::High));
        assert_eq!(card.when, "2h ago");
        let labels: Vec<&str> = card.details.iter().map(|d| d.label).collect();
        assert_eq!(labels, vec!["Specific Target", "Evidence Type"]);
    }

    #[test]
    fn test_card_for_scholar_view_moves_role_into_details() {
        let mut entry = sample();
        entry.optional_note = Some("Needed two prompts".into());
        let card = renderer().card(&entry, false, now());

        assert!(card.staff_line.is_none());
        let labels: Vec<&str> = card.details.iter().map(|d| d.label).collect();
        assert_eq!(
            labels,
            vec!["Specific Target", "Evidence Type", "Session Notes", "Submitted By"]
        );
    }

    #[test]
    fn test_card_tolerates_garbage() {
        let entry = JournalEntry {
            timestamp: "sometime".into(),
            performance_rating: "Stellar".into(),
            ..JournalEntry::default()
        };
        let card = renderer().card(&entry, true, now());
        assert_eq!(card.when, "sometime");
        assert_eq!(card.rating, RatingBadge::Unknown("Stellar".into()));

        let blank = renderer().card(&JournalEntry::default(), true, now());
        assert_eq!(blank.when, "Unknown date");
    }

    #[test]
    fn test_every_known_rating_classifies_to_one_tier() {
        for rating in PerformanceRating::ALL {
            let mut entry = sample();
            entry.performance_rating = rating.label().to_string();
            let card = renderer().card(&entry, true, now());
            assert_eq!(card.rating, RatingBadge::Known(rating));
        }
    }

    #[test]
    fn test_csv_single_entry_is_two_lines() {
        let csv = renderer().to_csv(&[sample()]);
        let lines: Vec<&str> = csv.split('\n').collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "Timestamp,Site,Staff Role,Staff PIN,Scholar ID,Skill Area,Specific Target,Evidence Type,Performance Rating,Notes,Image URL"
        );
        assert_eq!(
            lines[1],
            "\"10/15/2026, 1:00:00 PM\",\"Newark\",\"Tutor\",\"4471\",\"S-1023\",\"Reading\",\"Decoding, CVC words\",\"Observation\",\"High\",\"\",\"\""
        );
    }

    #[test]
    fn test_csv_preserves_entry_order() {
        let mut second = sample();
        second.scholar_id = "S-2000".into();
        let csv = renderer().to_csv(&[second, sample()]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("S-2000"));
        assert!(lines[2].contains("S-1023"));
    }
}
