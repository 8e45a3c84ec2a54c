use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stages an item moves through, in order. Carried on failure reports and
/// tracing events so a failed item names exactly where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStage {
    Pending,
    Reading,
    Decoding,
    Correcting,
    Compressing,
    ExtractingMetadata,
    Persisting,
    Done,
    Failed,
}

impl ItemStage {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStage::Pending => "pending",
            ItemStage::Reading => "reading",
            ItemStage::Decoding => "decoding",
            ItemStage::Correcting => "correcting",
            ItemStage::Compressing => "compressing",
            ItemStage::ExtractingMetadata => "extracting_metadata",
            ItemStage::Persisting => "persisting",
            ItemStage::Done => "done",
            ItemStage::Failed => "failed",
        }
    }
}

impl fmt::Display for ItemStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified per-item error. Only these kinds ever fail an item; orientation
/// correction and metadata extraction problems degrade in place and never
/// construct one of these.
#[derive(Debug, Error)]
pub enum ItemError {
    /// Source unreadable, empty, or artifact unwritable.
    #[error("I/O error: {0}")]
    Io(String),

    /// Bytes could not be interpreted as a supported image.
    #[error("decode error: {0}")]
    Decode(String),

    /// Content type outside the supported set.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Resize or re-encode failed. The original bytes are not persisted as a
    /// fallback; the item fails explicitly.
    #[error("compression error: {0}")]
    Compression(String),

    /// The batch was cancelled before this item ran.
    #[error("batch cancelled")]
    Cancelled,
}

impl ItemError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ItemError::Io(_) => FailureKind::Io,
            ItemError::Decode(_) => FailureKind::Decode,
            ItemError::UnsupportedFormat(_) => FailureKind::UnsupportedFormat,
            ItemError::Compression(_) => FailureKind::Compression,
            ItemError::Cancelled => FailureKind::Cancelled,
        }
    }
}

impl From<std::io::Error> for ItemError {
    fn from(err: std::io::Error) -> Self {
        ItemError::Io(err.to_string())
    }
}

pub type ItemResult<T> = Result<T, ItemError>;

/// Serializable mirror of [`ItemError`], carried on [`ItemFailure`] reports.
///
/// [`ItemFailure`]: crate::models::ItemFailure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Io,
    Decode,
    UnsupportedFormat,
    Compression,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Io => "io",
            FailureKind::Decode => "decode",
            FailureKind::UnsupportedFormat => "unsupported_format",
            FailureKind::Compression => "compression",
            FailureKind::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}
