//! Data models for the processing pipeline, organized by concept.

mod item;
mod metadata;
mod source;

// Re-export all models for convenient imports
pub use item::{BatchOutcome, BatchVerdict, ItemFailure, ProcessedItem};
pub use metadata::CaptureMetadata;
pub use source::SourceRef;
