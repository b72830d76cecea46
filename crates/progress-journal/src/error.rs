use std::path::PathBuf;
use thiserror::Error;

use crate::secrets::SecretError;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Image(#[from] ImageError),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Shared key could not be resolved: {0}")]
    SharedKey(#[from] SecretError),

    #[error("No config file found; create '{0}' or pass --config")]
    NotFound(PathBuf),
}

/// Client-side validation failures. None of these reach the network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select a performance rating")]
    MissingRating,

    #[error("Please fill in the {0} field")]
    MissingField(&'static str),

    #[error("Unknown performance rating '{0}'")]
    UnknownRating(String),

    #[error("Please enter a scholar identifier")]
    MissingScholarId,

    #[error("Please submit an entry first to set your site")]
    MissingSite,

    #[error("An entry is already being submitted")]
    AlreadySubmitting,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("Please select JPG or PNG only (got '{0}')")]
    UnsupportedType(String),

    #[error("Image must be under 10MB ({size} bytes given)")]
    TooLarge { size: u64 },

    #[error("Failed to read image '{path}': {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Every way a remote call can fail. Transport failures and `{error}` replies
/// are both just "failed with a message" to the controllers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network request failed: {0}")]
    Transport(String),

    #[error("Server responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response from server: {0}")]
    MalformedResponse(String),

    /// The API's own `{error: "..."}` text, passed through verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write session file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Could not determine a data directory for the session store")]
    NoDataDirectory,
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No data to export")]
    NothingToExport,

    #[error("Export is only available from the PIN history view")]
    WrongView,

    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File already exists: {0}")]
    FileExists(PathBuf),
}

pub type Result<T> = std::result::Result<T, JournalError>;
