//! Transient user-facing status messages.

use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

/// How long a toast stays on screen.
pub const TOAST_DISPLAY_MS: i64 = 3500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Toast {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, message)
    }

    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        now >= self.created_at
            && now - self.created_at < Duration::milliseconds(TOAST_DISPLAY_MS)
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);

    fn success(&self, message: &str) {
        self.notify(Toast::success(message));
    }

    fn error(&self, message: &str) {
        self.notify(Toast::error(message));
    }
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, toast: Toast) {
        (**self).notify(toast)
    }
}

/// Fans toasts out to any number of subscribers.
#[derive(Clone)]
pub struct ToastBroadcaster {
    sender: broadcast::Sender<Toast>,
}

impl ToastBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.sender.subscribe()
    }
}

impl Default for ToastBroadcaster {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Notifier for ToastBroadcaster {
    fn notify(&self, toast: Toast) {
        log::debug!("toast ({:?}): {}", toast.kind, toast.message);
        // No active receivers is fine
        let _ = self.sender.send(toast);
    }
}

/// Prints toasts to stderr, one per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, toast: Toast) {
        let prefix = match toast.kind {
            ToastKind::Success => "✓",
            ToastKind::Error => "✗",
        };
        let _ = writeln!(std::io::stderr(), "{} {}", prefix, toast.message);
    }
}
