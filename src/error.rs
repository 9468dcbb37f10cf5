/// Errors raised at the I/O edges of the guide
///
/// The guidance core itself never fails; only config and manifest handling
/// touch the filesystem or parse external data.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuideError {
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not determine the user configuration directory")]
    NoConfigDir,

    #[error("capture position {0} is not part of the layout")]
    UnknownPosition(usize),

    #[error("start heading is not set; capture at least one position first")]
    StartHeadingUnset,

    #[error("invalid setting {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("manifest entry {index} does not match the capture layout: {reason}")]
    ManifestMismatch { index: usize, reason: String },
}

impl GuideError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GuideError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GuideError>;
