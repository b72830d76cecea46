//! Request and response bodies of the journal API, and how replies map onto
//! success or [`ApiError`].

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::model::{JournalEntry, NewEntry};

/// Longest body excerpt carried in an error message.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Used when the server neither confirms success nor explains the failure.
const DEFAULT_SUBMIT_FAILURE: &str = "Failed to save entry";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest<'a> {
    pub key: &'a str,
    pub site: &'a str,
    pub staff_role: &'a str,
    pub staff_pin: &'a str,
    pub scholar_id: &'a str,
    pub skill_area: &'a str,
    pub specific_skill_target: &'a str,
    pub evidence_type: &'a str,
    pub performance_rating: &'a str,
    pub optional_note: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_filename: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_mime_type: Option<&'a str>,
}

impl<'a> SubmitRequest<'a> {
    pub fn new(key: &'a str, entry: &'a NewEntry) -> Self {
        let image = entry.image.as_ref();
        Self {
            key,
            site: &entry.site,
            staff_role: &entry.staff_role,
            staff_pin: &entry.staff_pin,
            scholar_id: &entry.scholar_id,
            skill_area: &entry.skill_area,
            specific_skill_target: &entry.specific_skill_target,
            evidence_type: &entry.evidence_type,
            performance_rating: entry.performance_rating.label(),
            optional_note: &entry.optional_note,
            image_base64: image.map(|i| i.data_url.as_str()),
            image_filename: image.map(|i| i.filename.as_str()),
            image_mime_type: image.map(|i| i.mime_type.as_str()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    entries: Option<Vec<JournalEntry>>,
    #[serde(default)]
    error: Option<String>,
}

fn truncate_body(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY_LENGTH) {
        Some((cut, _)) => format!("{}... (truncated)", &body[..cut]),
        None => body.to_string(),
    }
}

/// Pulls a non-empty `error` string out of a body, if it is JSON and has one.
fn error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorOnly {
        #[serde(default)]
        error: Option<String>,
    }

    serde_json::from_str::<ErrorOnly>(body)
        .ok()
        .and_then(|e| e.error)
        .filter(|e| !e.trim().is_empty())
}

fn check_status(status: u16, body: &str) -> Result<(), ApiError> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    match error_message(body) {
        Some(message) => Err(ApiError::Rejected(message)),
        None => Err(ApiError::Status {
            status,
            body: truncate_body(body),
        }),
    }
}

pub fn interpret_submit(status: u16, body: &str) -> Result<(), ApiError> {
    check_status(status, body)?;

    let response: SubmitResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::MalformedResponse(format!("{} in '{}'", e, truncate_body(body))))?;

    if let Some(error) = response.error.filter(|e| !e.trim().is_empty()) {
        return Err(ApiError::Rejected(error));
    }

    match response.status.as_deref() {
        Some("success") => Ok(()),
        _ => Err(ApiError::Rejected(DEFAULT_SUBMIT_FAILURE.to_string())),
    }
}

pub fn interpret_query(status: u16, body: &str) -> Result<Vec<JournalEntry>, ApiError> {
    check_status(status, body)?;

    let response: QueryResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::MalformedResponse(format!("{} in '{}'", e, truncate_body(body))))?;

    if let Some(error) = response.error.filter(|e| !e.trim().is_empty()) {
        return Err(ApiError::Rejected(error));
    }

    Ok(response.entries.unwrap_or_default())
}
