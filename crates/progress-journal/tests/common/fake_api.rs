#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use progress_journal::api::JournalApi;
use progress_journal::error::ApiError;
use progress_journal::model::{HistoryQuery, JournalEntry, NewEntry};

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Submit(NewEntry),
    Query(HistoryQuery),
}

/// Scripted `JournalApi`. Unscripted submits succeed and unscripted queries
/// return no entries.
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<ApiCall>>,
    submit_results: Mutex<VecDeque<Result<(), ApiError>>>,
    query_results: Mutex<VecDeque<Result<Vec<JournalEntry>, ApiError>>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_submit(&self, result: Result<(), ApiError>) -> &Self {
        self.submit_results.lock().unwrap().push_back(result);
        self
    }

    pub fn push_query(&self, result: Result<Vec<JournalEntry>, ApiError>) -> &Self {
        self.query_results.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn submitted(&self) -> Vec<NewEntry> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::Submit(entry) => Some(entry),
                ApiCall::Query(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl JournalApi for FakeApi {
    async fn submit(&self, entry: &NewEntry) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(ApiCall::Submit(entry.clone()));
        self.submit_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn query(&self, query: &HistoryQuery) -> Result<Vec<JournalEntry>, ApiError> {
        self.calls.lock().unwrap().push(ApiCall::Query(query.clone()));
        self.query_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
