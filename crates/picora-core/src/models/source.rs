use std::path::{Path, PathBuf};

use bytes::Bytes;

/// Opaque handle for one selectable item, handed over by a picker or capture
/// surface. Owned by the caller; the pipeline never mutates or deletes the
/// underlying source.
#[derive(Debug, Clone)]
pub enum SourceRef {
    /// Filesystem path.
    Path(PathBuf),
    /// In-memory buffer, e.g. bytes straight from a camera capture.
    Memory {
        name: String,
        content_type: Option<String>,
        data: Bytes,
    },
}

impl SourceRef {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        SourceRef::Path(path.into())
    }

    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        SourceRef::Memory {
            name: name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn from_bytes_typed(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        SourceRef::Memory {
            name: name.into(),
            content_type: Some(content_type.into()),
            data: data.into(),
        }
    }

    /// Name used for logging and derived-artifact naming.
    pub fn display_name(&self) -> String {
        match self {
            SourceRef::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned()),
            SourceRef::Memory { name, .. } => name.clone(),
        }
    }

    /// File extension of the source name, lowercased.
    pub fn extension(&self) -> Option<String> {
        let name = match self {
            SourceRef::Path(path) => return ext_of(path),
            SourceRef::Memory { name, .. } => name,
        };
        ext_of(Path::new(name))
    }

    /// Content type declared by the caller, when there is one.
    pub fn declared_content_type(&self) -> Option<&str> {
        match self {
            SourceRef::Path(_) => None,
            SourceRef::Memory { content_type, .. } => content_type.as_deref(),
        }
    }
}

fn ext_of(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}
