use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;

use crate::error::ImageError;
use crate::model::ImagePayload;
use crate::sanitize::redact_path;

/// Largest accepted image, 10 MiB.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

const ACCEPTED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

/// A file the user picked, not yet validated.
#[derive(Debug, Clone)]
pub struct ImageCandidate {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageCandidate {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads a file and guesses its MIME type from the extension.
    pub fn from_path(path: &Path) -> Result<Self, ImageError> {
        debug!("Reading image {}", redact_path(path));
        let bytes = std::fs::read(path).map_err(|e| ImageError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();

        Ok(Self::new(filename, mime_type, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Type first, then size. Exactly [`MAX_IMAGE_BYTES`] is accepted.
    pub fn validate(&self) -> Result<(), ImageError> {
        let mime = self.mime_type.to_ascii_lowercase();
        if !ACCEPTED_MIME_TYPES.contains(&mime.as_str()) {
            return Err(ImageError::UnsupportedType(self.mime_type.clone()));
        }
        if self.size() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge { size: self.size() });
        }
        Ok(())
    }
}

/// A validated, encoded image waiting to be sent with the next submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedImage {
    pub filename: String,
    pub mime_type: String,
    pub data_url: String,
    pub size: u64,
}

impl StagedImage {
    pub fn payload(&self) -> ImagePayload {
        ImagePayload {
            data_url: self.data_url.clone(),
            filename: self.filename.clone(),
            mime_type: self.mime_type.clone(),
        }
    }
}

/// `data:<mime>;base64,<payload>`
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Encodes off the async runtime's worker threads; a 10 MiB image is a few
/// milliseconds of CPU.
pub async fn encode_candidate(candidate: ImageCandidate) -> Result<StagedImage, ImageError> {
    tokio::task::spawn_blocking(move || {
        let data_url = encode_data_url(&candidate.mime_type, &candidate.bytes);
        StagedImage {
            size: candidate.size(),
            filename: candidate.filename,
            mime_type: candidate.mime_type,
            data_url,
        }
    })
    .await
    .map_err(|e| ImageError::Encode(e.to_string()))
}
