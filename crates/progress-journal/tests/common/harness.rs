//! Isolated environment for controller-level tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use chrono::FixedOffset;
use tempfile::TempDir;
use tokio::sync::broadcast;

use progress_journal::form::EntryFormController;
use progress_journal::history::{HistoryMode, HistoryViewController};
use progress_journal::notify::{Toast, ToastBroadcaster};
use progress_journal::render::EntryRenderer;
use progress_journal::session::{FileKeyValueStore, SessionStore};

pub struct TestHarness {
    temp_dir: TempDir,
    /// Where the session file lives.
    pub data_dir: PathBuf,
    pub toasts: ToastBroadcaster,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join("data");

        Self {
            temp_dir,
            data_dir,
            toasts: ToastBroadcaster::default(),
        }
    }

    /// A fresh store over the same file, like a new process would see.
    pub fn session(&self) -> SessionStore {
        SessionStore::new(Arc::new(FileKeyValueStore::in_directory(&self.data_dir)))
    }

    pub fn session_file(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    pub fn with_saved_identity(self, site: &str, role: &str, pin: &str) -> Self {
        self.session()
            .save(site, role, pin)
            .expect("Failed to save identity");
        self
    }

    pub fn renderer(&self) -> EntryRenderer {
        EntryRenderer::new(FixedOffset::east_opt(0).unwrap())
    }

    pub fn form(&self) -> EntryFormController {
        EntryFormController::new(self.session(), Arc::new(self.toasts.clone()))
    }

    pub fn pin_history(&self) -> HistoryViewController {
        HistoryViewController::new(HistoryMode::ByPin, self.session(), self.renderer())
    }

    pub fn scholar_history(&self) -> HistoryViewController {
        HistoryViewController::new(HistoryMode::ByScholar, self.session(), self.renderer())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.toasts.subscribe()
    }

    pub fn temp_path(&self) -> &std::path::Path {
        self.temp_dir.path()
    }
}

/// Drains every toast currently buffered on `rx`.
pub fn drain(rx: &mut broadcast::Receiver<Toast>) -> Vec<Toast> {
    let mut out = Vec::new();
    while let Ok(toast) = rx.try_recv() {
        out.push(toast);
    }
    out
}
