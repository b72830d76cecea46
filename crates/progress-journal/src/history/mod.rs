//! History views: entries by (site, PIN) and by (site, scholar).
//!
//! Fetching is split into `prepare_*` (validation, ticket) and [`complete`]
//! (apply the result) so overlapping queries resolve correctly: only the
//! response to the most recently issued ticket is applied.
//!
//! [`complete`]: HistoryViewController::complete

pub mod export;
pub mod filter;

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};

use crate::api::JournalApi;
use crate::error::{ApiError, ExportError, ValidationError};
use crate::model::{HistoryQuery, JournalEntry};
use crate::render::{EntryCard, EntryRenderer};
use crate::session::SessionStore;

pub use export::{export_filename, write_export, CsvExport};
pub use filter::RecencyFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    /// Everything logged at a site under one PIN, by anyone sharing it.
    ByPin,
    /// Everything logged at a site about one scholar.
    ByScholar,
}

/// Monotonic ticket source for outgoing queries.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_latest(&self, ticket: u64) -> bool {
        ticket == self.latest
    }
}

#[derive(Debug, Clone)]
#[must_use]
pub struct PendingQuery {
    pub ticket: u64,
    pub query: HistoryQuery,
}

#[derive(Debug, Clone)]
enum ViewState {
    Idle,
    CredentialsRequired,
    Loading,
    Loaded { query: HistoryQuery, entries: Vec<JournalEntry> },
    Failed { message: String },
}

/// Summary line above the PIN history cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryHeader {
    pub pin: String,
    pub site: String,
    pub count: usize,
}

impl HistoryHeader {
    pub fn count_label(&self) -> String {
        if self.count == 1 {
            "1 Entry".to_string()
        } else {
            format!("{} Entries", self.count)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleCard {
    /// Position in the fetched list; stable across filter changes.
    pub index: usize,
    pub expanded: bool,
    pub card: EntryCard,
}

/// What the view should currently show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedView {
    Idle,
    CredentialsRequired,
    Loading,
    Empty { message: String },
    Failed { message: String },
    Cards {
        header: Option<HistoryHeader>,
        cards: Vec<VisibleCard>,
    },
}

pub struct HistoryViewController {
    mode: HistoryMode,
    session: SessionStore,
    renderer: EntryRenderer,
    sequencer: RequestSequencer,
    state: ViewState,
    filter: RecencyFilter,
    expanded: BTreeSet<usize>,
}

impl HistoryViewController {
    pub fn new(mode: HistoryMode, session: SessionStore, renderer: EntryRenderer) -> Self {
        Self {
            mode,
            session,
            renderer,
            sequencer: RequestSequencer::default(),
            state: ViewState::Idle,
            filter: RecencyFilter::default(),
            expanded: BTreeSet::new(),
        }
    }

    pub fn mode(&self) -> HistoryMode {
        self.mode
    }

    pub fn filter(&self) -> RecencyFilter {
        self.filter
    }

    /// Re-filters already fetched data; never triggers a fetch.
    pub fn set_filter(&mut self, filter: RecencyFilter) {
        debug!("Recency filter set to {}", filter);
        self.filter = filter;
    }

    /// Fetched entries in server order, unfiltered.
    pub fn entries(&self) -> &[JournalEntry] {
        match &self.state {
            ViewState::Loaded { entries, .. } => entries,
            _ => &[],
        }
    }

    /// PIN history needs a saved site and a PIN (given or saved). Without
    /// them the view switches to `CredentialsRequired` and `None` is returned.
    pub fn prepare_pin_query(&mut self, pin_override: Option<&str>) -> Option<PendingQuery> {
        let saved = self.session.load();
        let pin = pin_override
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .or(saved.staff_pin);

        let (Some(site), Some(staff_pin)) = (saved.site, pin) else {
            info!("PIN history requested without saved credentials");
            self.state = ViewState::CredentialsRequired;
            return None;
        };

        Some(self.issue(HistoryQuery::ByPin { site, staff_pin }))
    }

    /// Scholar lookup needs a saved site and a non-blank scholar ID. On a
    /// validation error the current view is left as it was.
    pub fn prepare_scholar_query(
        &mut self,
        scholar_id: &str,
    ) -> Result<PendingQuery, ValidationError> {
        let scholar_id = scholar_id.trim();
        if scholar_id.is_empty() {
            return Err(ValidationError::MissingScholarId);
        }
        let site = self.session.load().site.ok_or(ValidationError::MissingSite)?;

        Ok(self.issue(HistoryQuery::ByScholar {
            site,
            scholar_id: scholar_id.to_string(),
        }))
    }

    fn issue(&mut self, query: HistoryQuery) -> PendingQuery {
        let ticket = self.sequencer.issue();
        self.state = ViewState::Loading;
        PendingQuery { ticket, query }
    }

    /// Applies a query result. Returns `false`, changing nothing, when a newer
    /// query has been issued since this one.
    pub fn complete(
        &mut self,
        pending: PendingQuery,
        result: Result<Vec<JournalEntry>, ApiError>,
    ) -> bool {
        if !self.sequencer.is_latest(pending.ticket) {
            debug!(
                "Discarding stale {} response (ticket {})",
                pending.query.path(),
                pending.ticket
            );
            return false;
        }

        self.expanded.clear();
        self.state = match result {
            Ok(entries) => ViewState::Loaded {
                query: pending.query,
                entries,
            },
            Err(e) => {
                warn!("Failed to load {}: {}", pending.query.path(), e);
                ViewState::Failed {
                    message: e.to_string(),
                }
            }
        };
        true
    }

    pub async fn load_pin_history(&mut self, api: &dyn JournalApi, pin_override: Option<&str>) {
        if let Some(pending) = self.prepare_pin_query(pin_override) {
            let result = api.query(&pending.query).await;
            self.complete(pending, result);
        }
    }

    pub async fn lookup_scholar(
        &mut self,
        api: &dyn JournalApi,
        scholar_id: &str,
    ) -> Result<(), ValidationError> {
        let pending = self.prepare_scholar_query(scholar_id)?;
        let result = api.query(&pending.query).await;
        self.complete(pending, result);
        Ok(())
    }

    /// Flips one card between collapsed and expanded; returns the new state.
    pub fn toggle_expanded(&mut self, index: usize) -> bool {
        if self.expanded.remove(&index) {
            false
        } else {
            self.expanded.insert(index);
            true
        }
    }

    pub fn expand_all(&mut self) {
        self.expanded = (0..self.entries().len()).collect();
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.contains(&index)
    }

    /// Loaded entries that pass the recency filter (scholar view only).
    pub fn visible_entries(&self, now: DateTime<Utc>) -> Vec<(usize, &JournalEntry)> {
        self.entries()
            .iter()
            .enumerate()
            .filter(|(_, entry)| self.mode == HistoryMode::ByPin || self.filter.admits(entry, now))
            .collect()
    }

    pub fn render(&self, now: DateTime<Utc>) -> RenderedView {
        match &self.state {
            ViewState::Idle => RenderedView::Idle,
            ViewState::CredentialsRequired => RenderedView::CredentialsRequired,
            ViewState::Loading => RenderedView::Loading,
            ViewState::Failed { message } => RenderedView::Failed {
                message: message.clone(),
            },
            ViewState::Loaded { query, entries } if entries.is_empty() => RenderedView::Empty {
                message: match query {
                    HistoryQuery::ByPin { staff_pin, .. } => {
                        format!("No entries yet for PIN: {}", staff_pin)
                    }
                    HistoryQuery::ByScholar { scholar_id, .. } => {
                        format!("No entries found for scholar \"{}\"", scholar_id)
                    }
                },
            },
            ViewState::Loaded { query, entries } => {
                let show_staff = self.mode == HistoryMode::ByPin;
                let cards: Vec<VisibleCard> = self
                    .visible_entries(now)
                    .into_iter()
                    .map(|(index, entry)| VisibleCard {
                        index,
                        expanded: self.is_expanded(index),
                        card: self.renderer.card(entry, show_staff, now),
                    })
                    .collect();

                if cards.is_empty() {
                    return RenderedView::Empty {
                        message: "No entries in selected time period".to_string(),
                    };
                }

                let header = match query {
                    HistoryQuery::ByPin { site, staff_pin } => Some(HistoryHeader {
                        pin: staff_pin.clone(),
                        site: site.clone(),
                        count: entries.len(),
                    }),
                    HistoryQuery::ByScholar { .. } => None,
                };

                RenderedView::Cards { header, cards }
            }
        }
    }

    /// CSV of everything fetched for the current PIN. Refuses when there is
    /// nothing loaded rather than producing a header-only file.
    pub fn export(&self, today: NaiveDate) -> Result<CsvExport, ExportError> {
        if self.mode != HistoryMode::ByPin {
            return Err(ExportError::WrongView);
        }

        let ViewState::Loaded {
            query: HistoryQuery::ByPin { staff_pin, .. },
            entries,
        } = &self.state
        else {
            return Err(ExportError::NothingToExport);
        };

        if entries.is_empty() {
            return Err(ExportError::NothingToExport);
        }

        Ok(CsvExport {
            filename: export_filename(staff_pin, today),
            contents: self.renderer.to_csv(entries),
        })
    }
}
