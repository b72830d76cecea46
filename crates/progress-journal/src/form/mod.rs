//! New-entry form: draft state, validation, and the submit cycle.
//!
//! Phases: `Editing → Submitting → Editing`. A successful submission saves
//! the staff identity, resets the form and re-fills the identity; a failed one
//! leaves every field, the rating and the staged image untouched for a retry.

pub mod image;

use std::sync::Arc;

use log::{error, info, warn};

use crate::api::JournalApi;
use crate::error::{ApiError, ImageError, JournalError, ValidationError};
use crate::model::{NewEntry, PerformanceRating};
use crate::notify::Notifier;
use crate::session::SessionStore;

pub use image::{encode_candidate, ImageCandidate, StagedImage, MAX_IMAGE_BYTES};

/// Free-text fields of the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub site: String,
    pub staff_role: String,
    pub staff_pin: String,
    pub scholar_id: String,
    pub skill_area: String,
    pub specific_skill_target: String,
    pub evidence_type: String,
    pub optional_note: String,
}

impl EntryDraft {
    fn required_fields(&self) -> [(&'static str, &str); 6] {
        [
            ("site", self.site.as_str()),
            ("staff role", self.staff_role.as_str()),
            ("staff PIN", self.staff_pin.as_str()),
            ("scholar ID", self.scholar_id.as_str()),
            ("skill area", self.skill_area.as_str()),
            ("evidence type", self.evidence_type.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Editing,
    Submitting,
}

/// What the user wants after a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostSubmitChoice {
    CreateAnother,
    ViewHistory,
}

/// Returned by [`EntryFormController::begin_submit`]; hand it back to
/// [`EntryFormController::finish_submit`] with the API result.
#[derive(Debug, Clone)]
#[must_use]
pub struct PendingSubmission {
    pub entry: NewEntry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved,
    Failed { message: String },
}

pub struct EntryFormController {
    draft: EntryDraft,
    rating: Option<PerformanceRating>,
    image: Option<StagedImage>,
    phase: FormPhase,
    session: SessionStore,
    notifier: Arc<dyn Notifier>,
}

impl EntryFormController {
    /// Starts in `Editing` with the identity fields pre-filled from the session.
    pub fn new(session: SessionStore, notifier: Arc<dyn Notifier>) -> Self {
        let mut controller = Self {
            draft: EntryDraft::default(),
            rating: None,
            image: None,
            phase: FormPhase::Editing,
            session,
            notifier,
        };
        controller.prefill_identity();
        controller
    }

    fn prefill_identity(&mut self) {
        let saved = self.session.load();
        if let Some(site) = saved.site {
            self.draft.site = site;
        }
        if let Some(role) = saved.staff_role {
            self.draft.staff_role = role;
        }
        if let Some(pin) = saved.staff_pin {
            self.draft.staff_pin = pin;
        }
    }

    pub fn draft(&self) -> &EntryDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut EntryDraft {
        &mut self.draft
    }

    pub fn rating(&self) -> Option<PerformanceRating> {
        self.rating
    }

    pub fn staged_image(&self) -> Option<&StagedImage> {
        self.image.as_ref()
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        self.phase == FormPhase::Editing
    }

    /// Exclusive choice: replaces any previous selection.
    pub fn select_rating(&mut self, rating: PerformanceRating) {
        self.rating = Some(rating);
    }

    /// Validates synchronously, then encodes. A rejected candidate leaves the
    /// currently staged image in place; an accepted one replaces it.
    pub async fn stage_image(&mut self, candidate: ImageCandidate) -> Result<(), ImageError> {
        if let Err(e) = candidate.validate() {
            warn!("Rejected image '{}': {}", candidate.filename, e);
            self.notifier.error(&e.to_string());
            return Err(e);
        }

        let staged = encode_candidate(candidate).await?;
        info!("Staged image '{}' ({} bytes)", staged.filename, staged.size);
        self.image = Some(staged);
        Ok(())
    }

    pub fn remove_image(&mut self) {
        self.image = None;
    }

    /// Validates the form and moves to `Submitting`. Nothing here touches the
    /// network; a validation failure leaves the phase at `Editing`.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, ValidationError> {
        if self.phase == FormPhase::Submitting {
            return Err(ValidationError::AlreadySubmitting);
        }

        if let Err(e) = self.validate() {
            self.notifier.error(&e.to_string());
            return Err(e);
        }

        let Some(rating) = self.rating else {
            return Err(ValidationError::MissingRating);
        };

        let draft = &self.draft;
        let entry = NewEntry {
            site: draft.site.trim().to_string(),
            staff_role: draft.staff_role.trim().to_string(),
            staff_pin: draft.staff_pin.trim().to_string(),
            scholar_id: draft.scholar_id.trim().to_string(),
            skill_area: draft.skill_area.trim().to_string(),
            specific_skill_target: draft.specific_skill_target.trim().to_string(),
            evidence_type: draft.evidence_type.trim().to_string(),
            performance_rating: rating,
            optional_note: draft.optional_note.trim().to_string(),
            image: self.image.as_ref().map(StagedImage::payload),
        };

        self.phase = FormPhase::Submitting;
        Ok(PendingSubmission { entry })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in self.draft.required_fields() {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(name));
            }
        }
        if self.rating.is_none() {
            return Err(ValidationError::MissingRating);
        }
        Ok(())
    }

    /// Applies the API result and returns to `Editing`.
    pub fn finish_submit(
        &mut self,
        pending: PendingSubmission,
        result: Result<(), ApiError>,
    ) -> SubmitOutcome {
        self.phase = FormPhase::Editing;

        match result {
            Ok(()) => {
                let entry = pending.entry;
                if let Err(e) = self
                    .session
                    .save(&entry.site, &entry.staff_role, &entry.staff_pin)
                {
                    // The entry is already stored remotely; only the convenience is lost.
                    error!("Failed to remember staff identity: {}", e);
                }
                self.reset();
                self.notifier.success("Session entry saved successfully!");
                SubmitOutcome::Saved
            }
            Err(e) => {
                let message = e.to_string();
                self.notifier
                    .error(&format!("Error saving entry: {}", message));
                SubmitOutcome::Failed { message }
            }
        }
    }

    /// Validate, send, apply. Validation errors come back as `Err` without a
    /// network call; API failures come back as `Ok(SubmitOutcome::Failed)`.
    pub async fn submit(&mut self, api: &dyn JournalApi) -> Result<SubmitOutcome, JournalError> {
        let pending = self.begin_submit()?;
        let result = api.submit(&pending.entry).await;
        Ok(self.finish_submit(pending, result))
    }

    /// Clears everything, then restores the saved identity.
    pub fn reset(&mut self) {
        self.draft = EntryDraft::default();
        self.rating = None;
        self.image = None;
        self.prefill_identity();
    }
}
