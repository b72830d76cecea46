pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod history;
pub mod logging;
pub mod model;
pub mod notify;
pub mod render;
pub mod sanitize;
pub mod secrets;
pub mod session;

pub use api::{JournalApi, RemoteJournalClient};
pub use config::{load_config, resolve, ClientConfig, ResolvedConfig};
pub use error::{
    ApiError, ConfigError, ExportError, ImageError, JournalError, Result, SessionError,
    ValidationError,
};
pub use form::{EntryFormController, FormPhase, ImageCandidate, SubmitOutcome};
pub use history::{HistoryMode, HistoryViewController, RecencyFilter, RenderedView};
pub use model::{HistoryQuery, JournalEntry, NewEntry, PerformanceRating};
pub use notify::{ConsoleNotifier, Notifier, Toast, ToastBroadcaster, ToastKind};
pub use render::EntryRenderer;
pub use secrets::{resolve_secret, SecretError};
pub use session::{SessionIdentity, SessionStore};
