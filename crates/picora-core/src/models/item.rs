use serde::{Deserialize, Serialize};

use super::metadata::CaptureMetadata;
use crate::error::{FailureKind, ItemStage};

/// Per-item success value. The artifact file exists and is non-empty when
/// this is handed out; ownership of the file passes to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedItem {
    /// Position of the originating ref in the submitted batch.
    pub index: usize,
    /// Addressable location of the derived artifact.
    pub uri: String,
    /// Derived display name, e.g. `compressed_beach.jpg` for re-encoded
    /// items, the source name for pass-through items.
    pub file_name: String,
    /// Pixel dimensions of the artifact. `None` for documents and for
    /// pass-through items whose bounds probe failed.
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub byte_size: u64,
    pub content_type: String,
    pub metadata: Option<CaptureMetadata>,
}

/// Per-item failure value. Every submitted ref that did not produce a
/// [`ProcessedItem`] is accounted for by exactly one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemFailure {
    /// Position of the originating ref in the submitted batch.
    pub index: usize,
    /// Display name of the failing source.
    pub source: String,
    pub kind: FailureKind,
    /// Stage that raised the failure.
    pub stage: ItemStage,
    pub reason: String,
}

/// Aggregate classification of one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchVerdict {
    AllSucceeded,
    PartialSuccess,
    AllFailed,
    Cancelled,
}

/// Aggregate result of one batch run. Successes keep the input order of
/// their refs, never completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub items: Vec<ProcessedItem>,
    pub failures: Vec<ItemFailure>,
    pub verdict: BatchVerdict,
}

impl BatchOutcome {
    /// Outcome of an empty submission: nothing ran, nothing failed.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            failures: Vec::new(),
            verdict: BatchVerdict::AllSucceeded,
        }
    }

    /// Derive the verdict from collected results. A cancelled batch reports
    /// `Cancelled` regardless of how far the in-flight items got.
    pub fn from_results(
        items: Vec<ProcessedItem>,
        failures: Vec<ItemFailure>,
        cancelled: bool,
    ) -> Self {
        let verdict = if cancelled {
            BatchVerdict::Cancelled
        } else if failures.is_empty() {
            BatchVerdict::AllSucceeded
        } else if items.is_empty() {
            BatchVerdict::AllFailed
        } else {
            BatchVerdict::PartialSuccess
        };
        Self {
            items,
            failures,
            verdict,
        }
    }

    /// Items plus failures; equals the submitted ref count.
    pub fn total(&self) -> usize {
        self.items.len() + self.failures.len()
    }
}
