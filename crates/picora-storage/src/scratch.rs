use crate::names;
use crate::traits::{ArtifactStore, StorageError, StorageResult, StoredArtifact};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Scratch-directory artifact store.
///
/// Writes every artifact as a flat file under one directory. Names are
/// generated per call (see [`names::unique_artifact_name`]), so concurrent
/// workers never contend on a lock and never collide; were two keys ever to
/// coincide anyway, the later write wins, matching `File::create` truncate
/// semantics.
#[derive(Debug, Clone)]
pub struct ScratchStore {
    root: PathBuf,
}

impl ScratchStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create scratch directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(ScratchStore { root })
    }

    /// Create a store in a per-process directory below the OS temp dir.
    pub async fn in_temp() -> StorageResult<Self> {
        let root = std::env::temp_dir().join(format!("picora-scratch-{}", std::process::id()));
        Self::new(root).await
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Convert an artifact key to a filesystem path.
    ///
    /// Keys are flat file names; anything that could resolve outside the
    /// scratch directory is rejected.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("empty key".to_string()));
        }
        if key.contains("..")
            || key.starts_with('/')
            || key.contains(std::path::MAIN_SEPARATOR)
            || key.contains('\\')
        {
            return Err(StorageError::InvalidKey(format!(
                "key escapes scratch directory: {}",
                key
            )));
        }

        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ArtifactStore for ScratchStore {
    async fn persist(
        &self,
        file_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StoredArtifact> {
        if data.is_empty() {
            return Err(StorageError::EmptyPayload(file_name.to_string()));
        }

        let key = names::unique_artifact_name(file_name);
        let path = self.key_to_path(&key)?;
        let size = data.len() as u64;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::PersistFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::PersistFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::PersistFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Scratch store persist successful"
        );

        Ok(StoredArtifact {
            key,
            uri: path.display().to_string(),
            size_bytes: size,
        })
    }

    async fn persist_stream(
        &self,
        file_name: &str,
        content_type: &str,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<StoredArtifact> {
        let key = names::unique_artifact_name(file_name);
        let path = self.key_to_path(&key)?;
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::PersistFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let bytes_copied = tokio::io::copy(&mut reader, &mut file).await.map_err(|e| {
            StorageError::PersistFailed(format!(
                "Failed to write stream to file {}: {}",
                path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::PersistFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        if bytes_copied == 0 {
            // Never hand out a handle to a zero-byte artifact.
            let _ = fs::remove_file(&path).await;
            return Err(StorageError::EmptyPayload(file_name.to_string()));
        }

        tracing::info!(
            path = %path.display(),
            key = %key,
            content_type = %content_type,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Scratch store stream persist successful"
        );

        Ok(StoredArtifact {
            key,
            uri: path.display().to_string(),
            size_bytes: bytes_copied,
        })
    }

    async fn read(&self, key: &str) -> StorageResult<Bytes> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Ok(Bytes::from(data))
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::RemoveFailed(format!("Failed to remove file {}: {}", path.display(), e))
        })?;

        tracing::info!(path = %path.display(), key = %key, "Scratch store remove successful");

        Ok(())
    }
}
