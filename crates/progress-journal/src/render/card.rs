use std::fmt::Write;

use crate::model::PerformanceRating;

/// Rating shown on a card. Labels outside the fixed set are shown as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingBadge {
    Known(PerformanceRating),
    Unknown(String),
}

impl RatingBadge {
    pub fn from_label(label: &str) -> Self {
        match PerformanceRating::classify(label) {
            Some(rating) => RatingBadge::Known(rating),
            None => RatingBadge::Unknown(label.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RatingBadge::Known(rating) => rating.label(),
            RatingBadge::Unknown(raw) if raw.trim().is_empty() => "Unrated",
            RatingBadge::Unknown(raw) => raw,
        }
    }

    /// Style hook: lowercased with whitespace runs collapsed to `-`.
    pub fn css_class(&self) -> String {
        self.label()
            .split_whitespace()
            .map(|word| word.to_lowercase())
            .collect::<Vec<_>>()
            .join("-")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

/// Display model for one entry. The header is always visible; `details` and
/// `image_url` only when the card is expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryCard {
    pub title: String,
    pub skill_area: String,
    pub staff_line: Option<String>,
    pub rating: RatingBadge,
    pub when: String,
    pub details: Vec<DetailRow>,
    pub image_url: Option<String>,
}

impl EntryCard {
    pub fn to_text(&self, expanded: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}  [{}]  {}", self.title, self.rating.label(), self.when);
        let _ = writeln!(out, "  {}", self.skill_area);
        if let Some(staff) = &self.staff_line {
            let _ = writeln!(out, "  {}", staff);
        }

        if expanded {
            for row in &self.details {
                let _ = writeln!(out, "    {}: {}", row.label, row.value);
            }
            if let Some(url) = &self.image_url {
                let _ = writeln!(out, "    Evidence Artifact: {}", url);
            }
        }

        out
    }
}
