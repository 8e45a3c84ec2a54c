//! Source acquisition and content-type detection.
//!
//! The reader resolves opaque [`SourceRef`]s into bytes or a streaming
//! handle. It knows nothing about transforms; classification of what the
//! bytes *are* lives in [`detect_content_type`].

use bytes::Bytes;
use picora_core::{ItemError, ItemResult, SourceRef};
use std::pin::Pin;
use tokio::fs;
use tokio::io::AsyncRead;

/// Resolves a [`SourceRef`] into raw bytes or a streaming handle.
#[derive(Debug, Default)]
pub struct SourceReader;

impl SourceReader {
    pub fn new() -> Self {
        SourceReader
    }

    /// Read the full source into memory. A source that cannot be opened or
    /// is empty yields a classified `Io` error, never a panic.
    pub async fn read(&self, source: &SourceRef) -> ItemResult<Bytes> {
        let data = match source {
            SourceRef::Path(path) => fs::read(path)
                .await
                .map(Bytes::from)
                .map_err(|e| ItemError::Io(format!("Failed to read {}: {}", path.display(), e)))?,
            SourceRef::Memory { data, .. } => data.clone(),
        };

        if data.is_empty() {
            return Err(ItemError::Io(format!(
                "Empty source: {}",
                source.display_name()
            )));
        }

        Ok(data)
    }

    /// Open the source as a reader plus a length hint when known. Used by
    /// the generic document path so large pass-through sources never sit
    /// fully in memory.
    pub async fn open_stream(
        &self,
        source: &SourceRef,
    ) -> ItemResult<(Pin<Box<dyn AsyncRead + Send + Unpin>>, Option<u64>)> {
        match source {
            SourceRef::Path(path) => {
                let file = fs::File::open(path).await.map_err(|e| {
                    ItemError::Io(format!("Failed to open {}: {}", path.display(), e))
                })?;
                let len = file.metadata().await.ok().map(|m| m.len());
                Ok((Box::pin(file), len))
            }
            SourceRef::Memory { data, .. } => {
                let len = data.len() as u64;
                Ok((Box::pin(std::io::Cursor::new(data.clone())), Some(len)))
            }
        }
    }

    /// Probe the source's byte length without reading it. `None` when the
    /// source cannot be inspected; the subsequent read reports the real
    /// failure.
    pub async fn byte_length(&self, source: &SourceRef) -> Option<u64> {
        match source {
            SourceRef::Path(path) => fs::metadata(path).await.ok().map(|m| m.len()),
            SourceRef::Memory { data, .. } => Some(data.len() as u64),
        }
    }
}

/// Fallback type for content nothing else recognizes; takes the document
/// pass-through path.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Resolve a source's content type without looking at its bytes: the
/// caller-declared type first, then the file extension.
pub fn declared_or_extension_type(source: &SourceRef) -> Option<String> {
    if let Some(declared) = source.declared_content_type() {
        return Some(declared.to_lowercase());
    }
    source
        .extension()
        .and_then(|ext| extension_content_type(&ext).map(str::to_string))
}

/// Resolve a source's content type, consulting the leading bytes when
/// neither the declared type nor the extension settles it.
pub fn detect_content_type(source: &SourceRef, head: &[u8]) -> String {
    declared_or_extension_type(source)
        .or_else(|| sniff_magic_bytes(head).map(str::to_string))
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}

pub fn is_image_type(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

fn extension_content_type(ext: &str) -> Option<&'static str> {
    match ext {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// Determine content type from magic bytes.
fn sniff_magic_bytes(head: &[u8]) -> Option<&'static str> {
    if head.starts_with(b"\xFF\xD8\xFF") {
        Some("image/jpeg")
    } else if head.starts_with(b"\x89PNG") {
        Some("image/png")
    } else if head.starts_with(b"GIF8") {
        Some("image/gif")
    } else if head.len() >= 12 && &head[0..4] == b"RIFF" && &head[8..12] == b"WEBP" {
        Some("image/webp")
    } else if head.starts_with(b"BM") {
        Some("image/bmp")
    } else if head.starts_with(b"%PDF") {
        Some("application/pdf")
    } else {
        None
    }
}
