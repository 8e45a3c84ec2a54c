//! Collision-free artifact name generation.
//!
//! Name format: `{sanitized_stem}_{yyyyMMdd_HHmmss}_{uuid}.{ext}`. The
//! timestamp plus a v4 UUID keeps names unique without any lock, across
//! workers and across process restarts.

use chrono::Utc;
use uuid::Uuid;

const MAX_STEM: usize = 120;

/// Sanitize a caller-supplied file stem for use inside an artifact key.
///
/// Strips any path components, rejects traversal sequences, and replaces
/// everything outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_stem(name: &str) -> String {
    let base = std::path::Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name);
    if base.contains("..") {
        return "file".to_string();
    }
    let s: String = base
        .chars()
        .take(MAX_STEM)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.trim_matches(|c| c == '_' || c == '.').is_empty() {
        "file".to_string()
    } else {
        s
    }
}

/// Generate a unique artifact key from a desired file name.
///
/// The extension (lowercased, alphanumeric only) is kept so consumers can
/// still tell artifact types apart by name; everything before it is the
/// sanitized stem plus the uniqueness suffix.
pub fn unique_artifact_name(file_name: &str) -> String {
    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            (stem, Some(ext.to_lowercase()))
        }
        _ => (file_name, None),
    };

    let stem = sanitize_stem(stem);
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let id = Uuid::new_v4();

    match ext {
        Some(ext) => format!("{}_{}_{}.{}", stem, timestamp, id, ext),
        None => format!("{}_{}_{}", stem, timestamp, id),
    }
}
