//! Per-item pipeline: read → decode → orient → compress → extract → persist.
//!
//! One run handles exactly one [`SourceRef`] and produces either a
//! [`ProcessedItem`] or an [`ItemFailure`] naming the stage that stopped it.
//! Non-image sources skip the transform stages and persist as-is through the
//! document path; images with `CompressionLevel::None` keep their original
//! bytes.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use picora_core::{
    CompressionLevel, ItemError, ItemFailure, ItemResult, ItemStage, ProcessedItem,
    ProcessingOptions, SourceRef,
};
use picora_storage::ArtifactStore;

use crate::compression::Compressor;
use crate::decode;
use crate::metadata::MetadataExtractor;
use crate::orientation::OrientationCorrector;
use crate::source::{self, SourceReader};
use crate::validator::MediaValidator;

/// Document sources above this size stream straight to storage instead of
/// buffering in memory.
const STREAM_THRESHOLD_BYTES: u64 = 8 * 1024 * 1024;

/// Content type every re-encoded image carries.
const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Executes the full stage sequence for a single source.
pub struct ItemPipeline {
    reader: SourceReader,
    store: Arc<dyn ArtifactStore>,
}

impl ItemPipeline {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            reader: SourceReader::new(),
            store,
        }
    }

    /// Process one source end to end. Never panics; every error is folded
    /// into an [`ItemFailure`] tagged with the input index and the stage
    /// that raised it.
    pub async fn run(
        &self,
        index: usize,
        source: &SourceRef,
        options: &ProcessingOptions,
    ) -> Result<ProcessedItem, ItemFailure> {
        let started = Instant::now();
        let mut stage = ItemStage::Pending;

        match self.execute(index, source, options, &mut stage).await {
            Ok(item) => {
                tracing::info!(
                    index = index,
                    source = %source.display_name(),
                    file_name = %item.file_name,
                    content_type = %item.content_type,
                    size_bytes = item.byte_size,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Item processed"
                );
                Ok(item)
            }
            Err(e) => {
                tracing::warn!(
                    index = index,
                    source = %source.display_name(),
                    stage = %stage,
                    kind = %e.kind(),
                    error = %e,
                    "Item failed"
                );
                Err(ItemFailure {
                    index,
                    source: source.display_name(),
                    kind: e.kind(),
                    stage,
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn execute(
        &self,
        index: usize,
        source: &SourceRef,
        options: &ProcessingOptions,
        stage: &mut ItemStage,
    ) -> ItemResult<ProcessedItem> {
        let validator = MediaValidator::new(options.allowed_content_types.clone());
        *stage = ItemStage::Reading;

        // A source already known to be a non-image can stream to storage
        // without ever buffering, when it is large enough to matter.
        if let Some(declared) = source::declared_or_extension_type(source) {
            if !source::is_image_type(&declared) {
                validator.validate_content_type(&declared)?;
                let length = self.reader.byte_length(source).await;
                if length.is_some_and(|len| len > STREAM_THRESHOLD_BYTES) {
                    return self.stream_document(index, source, &declared, stage).await;
                }
            }
        }

        let data = self.reader.read(source).await?;
        let content_type = source::detect_content_type(source, &data);
        validator.validate_content_type(&content_type)?;

        if !source::is_image_type(&content_type) {
            return self
                .persist_document(index, source, &content_type, data, stage)
                .await;
        }

        if options.compression == Some(CompressionLevel::None) {
            return self
                .persist_original(index, source, &content_type, data, options, stage)
                .await;
        }

        // Full image path. Each CPU stage takes its own blocking-pool hop.
        *stage = ItemStage::Decoding;
        let decode_input = data.clone();
        let decoded = tokio::task::spawn_blocking(move || decode::decode_image(&decode_input))
            .await
            .map_err(|e| ItemError::Decode(format!("decode task failed: {}", e)))??;

        // Correction itself never fails; only a panicked worker surfaces.
        *stage = ItemStage::Correcting;
        let upright = tokio::task::spawn_blocking(move || OrientationCorrector::correct(decoded))
            .await
            .map_err(|e| ItemError::Decode(format!("orientation task failed: {}", e)))?;

        *stage = ItemStage::Compressing;
        let level = options.compression;
        let (encoded, width, height) =
            tokio::task::spawn_blocking(move || Compressor::compress(&upright.pixels, level))
                .await
                .map_err(|e| ItemError::Compression(format!("encode task failed: {}", e)))??;

        // Metadata reads the original bytes, not the compressed output.
        *stage = ItemStage::ExtractingMetadata;
        let metadata = options
            .include_metadata
            .then(|| MetadataExtractor::extract(&data))
            .flatten();

        *stage = ItemStage::Persisting;
        let file_name = compressed_file_name(source);
        let stored = self
            .store
            .persist(&file_name, JPEG_CONTENT_TYPE, encoded)
            .await
            .map_err(|e| ItemError::Io(e.to_string()))?;

        *stage = ItemStage::Done;
        Ok(ProcessedItem {
            index,
            uri: stored.uri,
            file_name,
            width: Some(width),
            height: Some(height),
            byte_size: stored.size_bytes,
            content_type: JPEG_CONTENT_TYPE.to_string(),
            metadata,
        })
    }

    /// Pass-through for images the caller asked to keep untouched. The
    /// bounds probe and metadata extraction are both soft: either may come
    /// up empty without failing the item.
    async fn persist_original(
        &self,
        index: usize,
        source: &SourceRef,
        content_type: &str,
        data: Bytes,
        options: &ProcessingOptions,
        stage: &mut ItemStage,
    ) -> ItemResult<ProcessedItem> {
        let dimensions = decode::probe_dimensions(&data);
        let metadata = options
            .include_metadata
            .then(|| MetadataExtractor::extract(&data))
            .flatten();

        *stage = ItemStage::Persisting;
        let file_name = source.display_name();
        let stored = self
            .store
            .persist(&file_name, content_type, data)
            .await
            .map_err(|e| ItemError::Io(e.to_string()))?;

        *stage = ItemStage::Done;
        Ok(ProcessedItem {
            index,
            uri: stored.uri,
            file_name,
            width: dimensions.map(|d| d.0),
            height: dimensions.map(|d| d.1),
            byte_size: stored.size_bytes,
            content_type: content_type.to_string(),
            metadata,
        })
    }

    /// Buffered document path: anything that is not an image persists
    /// unchanged, with no dimensions and no metadata.
    async fn persist_document(
        &self,
        index: usize,
        source: &SourceRef,
        content_type: &str,
        data: Bytes,
        stage: &mut ItemStage,
    ) -> ItemResult<ProcessedItem> {
        *stage = ItemStage::Persisting;
        let file_name = source.display_name();
        let stored = self
            .store
            .persist(&file_name, content_type, data)
            .await
            .map_err(|e| ItemError::Io(e.to_string()))?;

        *stage = ItemStage::Done;
        Ok(ProcessedItem {
            index,
            uri: stored.uri,
            file_name,
            width: None,
            height: None,
            byte_size: stored.size_bytes,
            content_type: content_type.to_string(),
            metadata: None,
        })
    }

    /// Streaming document path for large non-image sources.
    async fn stream_document(
        &self,
        index: usize,
        source: &SourceRef,
        content_type: &str,
        stage: &mut ItemStage,
    ) -> ItemResult<ProcessedItem> {
        let (reader, length) = self.reader.open_stream(source).await?;
        tracing::debug!(
            source = %source.display_name(),
            length = ?length,
            "streaming document to storage"
        );

        *stage = ItemStage::Persisting;
        let file_name = source.display_name();
        let stored = self
            .store
            .persist_stream(&file_name, content_type, reader)
            .await
            .map_err(|e| ItemError::Io(e.to_string()))?;

        *stage = ItemStage::Done;
        Ok(ProcessedItem {
            index,
            uri: stored.uri,
            file_name,
            width: None,
            height: None,
            byte_size: stored.size_bytes,
            content_type: content_type.to_string(),
            metadata: None,
        })
    }
}

/// Name for a re-encoded artifact: the source stem with a `compressed_`
/// prefix and the output container's extension.
fn compressed_file_name(source: &SourceRef) -> String {
    let name = source.display_name();
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name.as_str(),
    };
    format!("compressed_{}.jpg", stem)
}
