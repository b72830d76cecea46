use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, info_span, warn, Instrument};

use super::wire::{interpret_query, interpret_submit, SubmitRequest};
use super::JournalApi;
use crate::config::ResolvedConfig;
use crate::error::ApiError;
use crate::model::{HistoryQuery, JournalEntry, NewEntry};
use crate::sanitize::{mask_pin, redact_key_param};

/// Default connect timeout for HTTP requests.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The only gateway to the journal API.
///
/// Submissions are never retried: the protocol has no idempotency key, so a
/// retried POST can create a duplicate row.
pub struct RemoteJournalClient {
    client: Client,
    api_base: String,
    shared_key: SecretString,
}

fn create_http_client(
    connect_timeout: Duration,
    request_timeout: Option<Duration>,
) -> Result<Client, ApiError> {
    let mut builder = Client::builder()
        .connect_timeout(connect_timeout)
        .user_agent(concat!("progress-journal/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = request_timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(|e| ApiError::ClientBuild(e.to_string()))
}

impl RemoteJournalClient {
    pub fn new(api_base: impl Into<String>, shared_key: SecretString) -> Result<Self, ApiError> {
        Ok(Self {
            client: create_http_client(DEFAULT_CONNECT_TIMEOUT, None)?,
            api_base: api_base.into(),
            shared_key,
        })
    }

    pub fn from_config(config: &ResolvedConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: create_http_client(config.connect_timeout, config.request_timeout)?,
            api_base: config.api_base.clone(),
            shared_key: config.shared_key.clone(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Sends a request and returns the status code with the raw body text.
    async fn execute(&self, request: reqwest::Request) -> Result<(u16, String), ApiError> {
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("Failed to read response body: {}", e)))?;
        Ok((status, body))
    }
}

#[async_trait]
impl JournalApi for RemoteJournalClient {
    async fn submit(&self, entry: &NewEntry) -> Result<(), ApiError> {
        let span = info_span!(
            "journal.submit",
            site = %entry.site,
            pin = %mask_pin(&entry.staff_pin),
            has_image = entry.image.is_some()
        );

        async {
            let payload = SubmitRequest::new(self.shared_key.expose_secret(), entry);
            let request = self
                .client
                .post(&self.api_base)
                .json(&payload)
                .build()
                .map_err(|e| ApiError::Transport(format!("Failed to build request: {}", e)))?;

            info!("Submitting entry for scholar {}", entry.scholar_id);
            let (status, body) = self.execute(request).await?;

            match interpret_submit(status, &body) {
                Ok(()) => {
                    info!("Entry saved");
                    Ok(())
                }
                Err(e) => {
                    warn!("Submission failed: {}", e);
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn query(&self, query: &HistoryQuery) -> Result<Vec<JournalEntry>, ApiError> {
        let span = info_span!("journal.query", path = query.path(), site = %query.site());

        async {
            let key = self.shared_key.expose_secret();
            let mut params: Vec<(&str, &str)> =
                vec![("key", key), ("path", query.path()), ("site", query.site())];
            let selector = match query {
                HistoryQuery::ByPin { staff_pin, .. } => {
                    params.push(("staffPin", staff_pin.as_str()));
                    format!("pin {}", mask_pin(staff_pin))
                }
                HistoryQuery::ByScholar { scholar_id, .. } => {
                    params.push(("scholarId", scholar_id.as_str()));
                    format!("scholar {}", scholar_id)
                }
            };

            let request = self
                .client
                .get(&self.api_base)
                .query(&params)
                .build()
                .map_err(|e| ApiError::Transport(format!("Failed to build request: {}", e)))?;

            info!("Querying {} history for {}", query.path(), selector);
            debug!("GET {}", redact_key_param(request.url().as_str()));

            let (status, body) = self.execute(request).await?;
            match interpret_query(status, &body) {
                Ok(entries) => {
                    info!("Query returned {} entries", entries.len());
                    Ok(entries)
                }
                Err(e) => {
                    warn!("Query failed: {}", e);
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}
