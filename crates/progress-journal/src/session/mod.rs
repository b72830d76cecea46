//! Remembers the last-used site, staff role and staff PIN between runs.
//!
//! This is a convenience for consecutive entries on one device, not an
//! authentication mechanism. Values are stored in plain text.

pub mod kv;

use std::sync::Arc;

use log::{debug, info};

use crate::error::SessionError;
use crate::sanitize::mask_pin;

pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};

pub const SITE_KEY: &str = "journal_site";
pub const STAFF_ROLE_KEY: &str = "journal_staffRole";
pub const STAFF_PIN_KEY: &str = "journal_staffPin";

/// The remembered identity. Each field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionIdentity {
    pub site: Option<String>,
    pub staff_role: Option<String>,
    pub staff_pin: Option<String>,
}

impl SessionIdentity {
    pub fn is_empty(&self) -> bool {
        self.site.is_none() && self.staff_role.is_none() && self.staff_pin.is_none()
    }
}

#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKeyValueStore::new()))
    }

    /// Overwrites any previously saved identity.
    pub fn save(&self, site: &str, staff_role: &str, staff_pin: &str) -> Result<(), SessionError> {
        self.backend.set_many(&[
            (SITE_KEY, site),
            (STAFF_ROLE_KEY, staff_role),
            (STAFF_PIN_KEY, staff_pin),
        ])?;
        info!(
            "Saved session identity (site: {}, role: {}, pin: {})",
            site,
            staff_role,
            mask_pin(staff_pin)
        );
        Ok(())
    }

    pub fn load(&self) -> SessionIdentity {
        let read = |key: &str| self.backend.get(key).filter(|v| !v.is_empty());
        let identity = SessionIdentity {
            site: read(SITE_KEY),
            staff_role: read(STAFF_ROLE_KEY),
            staff_pin: read(STAFF_PIN_KEY),
        };
        debug!("Loaded session identity (empty: {})", identity.is_empty());
        identity
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        self.backend
            .remove_many(&[SITE_KEY, STAFF_ROLE_KEY, STAFF_PIN_KEY])?;
        info!("Cleared session identity");
        Ok(())
    }
}
