use std::path::PathBuf;
use std::time::Duration;

use chrono::FixedOffset;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// On-disk client configuration (`config.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base URL of the journal API endpoint. Both writes and reads go here.
    #[serde(default)]
    pub api_base: String,
    #[serde(default)]
    pub shared_key: Option<String>,
    #[serde(default)]
    pub shared_key_file: Option<String>,
    #[serde(default)]
    pub shared_key_env_var: Option<String>,
    /// Overrides where the session store keeps its file.
    #[serde(default)]
    pub data_directory: Option<String>,
    /// Overall request timeout. Unset means the transport default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Offset used for absolute dates and CSV timestamps. Unset means local time.
    #[serde(default)]
    pub timezone_offset_minutes: Option<i32>,
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            shared_key: None,
            shared_key_file: None,
            shared_key_env_var: None,
            data_directory: None,
            request_timeout_secs: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            timezone_offset_minutes: None,
        }
    }
}

/// Validated configuration with the shared key resolved.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_base: String,
    pub shared_key: SecretString,
    pub data_directory: Option<PathBuf>,
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Duration,
    pub utc_offset: Option<FixedOffset>,
}
