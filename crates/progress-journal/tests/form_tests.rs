//! Entry form scenarios: validation, image staging and the submit cycle.

mod common;

use common::harness::drain;
use common::{jpeg_bytes, FakeApi, TestHarness};

use progress_journal::error::{ApiError, ImageError, JournalError, ValidationError};
use progress_journal::form::{FormPhase, ImageCandidate, SubmitOutcome};
use progress_journal::model::PerformanceRating;
use progress_journal::notify::ToastKind;

fn fill_entry(form: &mut progress_journal::form::EntryFormController) {
    let draft = form.draft_mut();
    draft.site = "Newark".into();
    draft.staff_role = "Tutor".into();
    draft.staff_pin = "4471".into();
    draft.scholar_id = "S-1023".into();
    draft.skill_area = "Reading".into();
    draft.specific_skill_target = "Decoding".into();
    draft.evidence_type = "Observation".into();
    draft.optional_note = "Read aloud".into();
}

#[tokio::test]
async fn test_successful_submit_keeps_identity_and_clears_the_rest() {
    let harness = TestHarness::new();
    let api = FakeApi::new();
    let mut rx = harness.subscribe();

    let mut form = harness.form();
    fill_entry(&mut form);
    form.select_rating(PerformanceRating::High);

    let outcome = form.submit(&api).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Saved);

    let submitted = api.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].site, "Newark");
    assert_eq!(submitted[0].staff_pin, "4471");
    assert_eq!(submitted[0].performance_rating, PerformanceRating::High);

    let draft = form.draft();
    assert_eq!(draft.site, "Newark");
    assert_eq!(draft.staff_role, "Tutor");
    assert_eq!(draft.staff_pin, "4471");
    assert!(draft.scholar_id.is_empty());
    assert!(draft.skill_area.is_empty());
    assert!(draft.optional_note.is_empty());
    assert_eq!(form.rating(), None);
    assert_eq!(form.phase(), FormPhase::Editing);

    let toasts = drain(&mut rx);
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Success);
    assert_eq!(toasts[0].message, "Session entry saved successfully!");

    // A later run sees the same identity.
    let identity = harness.session().load();
    assert_eq!(identity.site.as_deref(), Some("Newark"));
    assert_eq!(identity.staff_pin.as_deref(), Some("4471"));
    assert!(harness.session_file().exists());

    let reopened = harness.form();
    assert_eq!(reopened.draft().staff_role, "Tutor");
}

#[tokio::test]
async fn test_submit_without_rating_never_calls_network() {
    let harness = TestHarness::new();
    let api = FakeApi::new();
    let mut rx = harness.subscribe();

    let mut form = harness.form();
    fill_entry(&mut form);

    let result = form.submit(&api).await;
    assert!(matches!(
        result,
        Err(JournalError::Validation(ValidationError::MissingRating))
    ));
    assert_eq!(api.call_count(), 0);
    assert_eq!(form.draft().scholar_id, "S-1023");

    let toasts = drain(&mut rx);
    assert_eq!(toasts[0].kind, ToastKind::Error);
    assert_eq!(toasts[0].message, "Please select a performance rating");
}

#[tokio::test]
async fn test_missing_required_field_reported_before_rating() {
    let harness = TestHarness::new();
    let api = FakeApi::new();

    let mut form = harness.form();
    fill_entry(&mut form);
    form.draft_mut().evidence_type = "   ".into();

    let err = form.begin_submit().unwrap_err();
    assert_eq!(err, ValidationError::MissingField("evidence type"));
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn test_failed_submit_preserves_everything() {
    let harness = TestHarness::new();
    let api = FakeApi::new();
    api.push_submit(Err(ApiError::Rejected("Invalid key".into())));
    let mut rx = harness.subscribe();

    let mut form = harness.form();
    fill_entry(&mut form);
    form.select_rating(PerformanceRating::Mid);
    form.stage_image(ImageCandidate::new("w.png", "image/png", vec![1, 2, 3]))
        .await
        .unwrap();

    let outcome = form.submit(&api).await.unwrap();
    assert_eq!(
        outcome,
        SubmitOutcome::Failed {
            message: "Invalid key".into()
        }
    );

    assert_eq!(form.draft().scholar_id, "S-1023");
    assert_eq!(form.rating(), Some(PerformanceRating::Mid));
    assert!(form.staged_image().is_some());
    assert!(form.can_submit());
    assert!(harness.session().load().is_empty());

    let toasts = drain(&mut rx);
    assert_eq!(toasts.last().unwrap().message, "Error saving entry: Invalid key");
}

#[tokio::test]
async fn test_image_over_limit_rejected() {
    let harness = TestHarness::new();
    let mut form = harness.form();

    let candidate = ImageCandidate::new("big.jpg", "image/jpeg", jpeg_bytes(11 * 1024 * 1024));
    let err = form.stage_image(candidate).await.unwrap_err();

    assert!(matches!(err, ImageError::TooLarge { .. }));
    assert!(form.staged_image().is_none());
}

#[tokio::test]
async fn test_five_megabyte_jpeg_staged_as_data_url() {
    let harness = TestHarness::new();
    let mut form = harness.form();

    let candidate = ImageCandidate::new("photo.jpg", "image/jpeg", jpeg_bytes(5 * 1024 * 1024));
    form.stage_image(candidate).await.unwrap();

    let staged = form.staged_image().unwrap();
    assert!(staged.data_url.starts_with("data:image/jpeg;base64,"));
    assert_eq!(staged.filename, "photo.jpg");
    assert_eq!(staged.size, 5 * 1024 * 1024);
}

#[tokio::test]
async fn test_gif_rejected_and_previous_image_kept() {
    let harness = TestHarness::new();
    let mut rx = harness.subscribe();
    let mut form = harness.form();

    form.stage_image(ImageCandidate::new("first.png", "image/png", vec![9, 9]))
        .await
        .unwrap();
    let err = form
        .stage_image(ImageCandidate::new("anim.gif", "image/gif", vec![1]))
        .await
        .unwrap_err();

    assert_eq!(err, ImageError::UnsupportedType("image/gif".into()));
    assert_eq!(form.staged_image().unwrap().filename, "first.png");

    let toasts = drain(&mut rx);
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Error);
}

#[tokio::test]
async fn test_staged_image_travels_with_submission() {
    let harness = TestHarness::new();
    let api = FakeApi::new();
    let mut form = harness.form();
    fill_entry(&mut form);
    form.select_rating(PerformanceRating::Low);
    form.stage_image(ImageCandidate::new("w.png", "image/png", b"hi".to_vec()))
        .await
        .unwrap();

    form.submit(&api).await.unwrap();

    let image = api.submitted()[0].image.clone().unwrap();
    assert_eq!(image.data_url, "data:image/png;base64,aGk=");
    assert_eq!(image.mime_type, "image/png");
    assert!(form.staged_image().is_none());
}

#[tokio::test]
async fn test_second_begin_while_submitting_is_refused() {
    let harness = TestHarness::new();
    let mut form = harness.form();
    fill_entry(&mut form);
    form.select_rating(PerformanceRating::High);

    let pending = form.begin_submit().unwrap();
    assert!(!form.can_submit());
    assert_eq!(
        form.begin_submit().unwrap_err(),
        ValidationError::AlreadySubmitting
    );

    form.finish_submit(pending, Ok(()));
    assert!(form.can_submit());
}
