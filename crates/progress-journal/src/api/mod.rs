//! Gateway to the spreadsheet-backed journal API.
//!
//! Two operations exist: submit one entry (POST) and query entries by PIN or
//! by scholar (GET). Both authenticate with the shared key. Every failure mode
//! is folded into [`ApiError`]; nothing is retried automatically.

pub mod client;
pub mod wire;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::{HistoryQuery, JournalEntry, NewEntry};

pub use client::RemoteJournalClient;

#[async_trait]
pub trait JournalApi: Send + Sync {
    /// Creates one entry. At most once per call.
    async fn submit(&self, entry: &NewEntry) -> Result<(), ApiError>;

    /// Returns matching entries in server order.
    async fn query(&self, query: &HistoryQuery) -> Result<Vec<JournalEntry>, ApiError>;
}
