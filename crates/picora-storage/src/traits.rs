//! Storage abstraction trait
//!
//! This module defines the ArtifactStore trait the pipeline persists derived
//! artifacts through.

use async_trait::async_trait;
use bytes::Bytes;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Persist failed: {0}")]
    PersistFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Remove failed: {0}")]
    RemoveFailed(String),

    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("Invalid artifact key: {0}")]
    InvalidKey(String),

    #[error("Empty payload for {0}")]
    EmptyPayload(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Handle to one persisted artifact. Resolvable immediately upon return:
/// stores flush and sync before handing one of these out.
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    /// Unique key the artifact was stored under.
    pub key: String,
    /// Addressable location (absolute path for filesystem stores).
    pub uri: String,
    pub size_bytes: u64,
}

/// Artifact persistence seam.
///
/// The pipeline only ever talks to storage through this trait, so tests can
/// substitute failing or counting stores without touching the pipeline. A
/// store never returns success for an artifact that is missing or zero bytes.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist a byte buffer under a freshly generated unique key derived
    /// from `file_name`. Empty payloads are rejected.
    async fn persist(
        &self,
        file_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StoredArtifact>;

    /// Persist from a reader without buffering the whole payload, for large
    /// pass-through sources. The reader is consumed until EOF; a stream that
    /// yields zero bytes is rejected like an empty buffer.
    async fn persist_stream(
        &self,
        file_name: &str,
        content_type: &str,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<StoredArtifact>;

    /// Read a persisted artifact back by its key.
    async fn read(&self, key: &str) -> StorageResult<Bytes>;

    /// Remove an artifact. Removing a key that no longer exists is not an
    /// error; cleanup is a caller concern and may race.
    async fn remove(&self, key: &str) -> StorageResult<()>;
}
