//! Store test doubles: one that always fails, and one that holds persist
//! calls at a gate so tests can cancel a batch at a known point.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use picora_storage::{ArtifactStore, ScratchStore, StorageError, StorageResult, StoredArtifact};
use tokio::io::AsyncRead;
use tokio::sync::{Notify, Semaphore};

/// Rejects every persist, so pipelines fail at the persisting stage.
pub struct FailingStore;

#[async_trait]
impl ArtifactStore for FailingStore {
    async fn persist(
        &self,
        file_name: &str,
        _content_type: &str,
        _data: Bytes,
    ) -> StorageResult<StoredArtifact> {
        Err(StorageError::PersistFailed(format!(
            "simulated disk full for {}",
            file_name
        )))
    }

    async fn persist_stream(
        &self,
        file_name: &str,
        _content_type: &str,
        _reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<StoredArtifact> {
        Err(StorageError::PersistFailed(format!(
            "simulated disk full for {}",
            file_name
        )))
    }

    async fn read(&self, key: &str) -> StorageResult<Bytes> {
        Err(StorageError::NotFound(key.to_string()))
    }

    async fn remove(&self, _key: &str) -> StorageResult<()> {
        Ok(())
    }
}

/// Delegates to a [`ScratchStore`] but parks each persist at a semaphore
/// until the test releases it. `entered` fires when a persist call arrives,
/// so the test knows an item is in flight.
pub struct GatedStore {
    pub inner: ScratchStore,
    pub gate: Arc<Semaphore>,
    pub entered: Arc<Notify>,
}

impl GatedStore {
    pub async fn new(root: &std::path::Path) -> Self {
        Self {
            inner: ScratchStore::new(root).await.unwrap(),
            gate: Arc::new(Semaphore::new(0)),
            entered: Arc::new(Notify::new()),
        }
    }

    pub fn open(&self, slots: usize) {
        self.gate.add_permits(slots);
    }
}

#[async_trait]
impl ArtifactStore for GatedStore {
    async fn persist(
        &self,
        file_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StoredArtifact> {
        self.entered.notify_one();
        let _slot = self
            .gate
            .acquire()
            .await
            .map_err(|_| StorageError::PersistFailed("gate closed".to_string()))?;
        self.inner.persist(file_name, content_type, data).await
    }

    async fn persist_stream(
        &self,
        file_name: &str,
        content_type: &str,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<StoredArtifact> {
        self.entered.notify_one();
        let _slot = self
            .gate
            .acquire()
            .await
            .map_err(|_| StorageError::PersistFailed("gate closed".to_string()))?;
        self.inner
            .persist_stream(file_name, content_type, reader)
            .await
    }

    async fn read(&self, key: &str) -> StorageResult<Bytes> {
        self.inner.read(key).await
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.inner.remove(key).await
    }
}
