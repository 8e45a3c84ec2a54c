//! Picora Core Library
//!
//! This crate provides the shared data model, the classified error taxonomy,
//! batch configuration, and telemetry bootstrap used by the picora media
//! processing pipeline crates.

pub mod error;
pub mod models;
pub mod options;
pub mod telemetry;

// Re-export commonly used types
pub use error::{FailureKind, ItemError, ItemResult, ItemStage};
pub use models::{BatchOutcome, BatchVerdict, CaptureMetadata, ItemFailure, ProcessedItem, SourceRef};
pub use options::{
    adaptive_jpeg_quality, BatchContext, CompressionLevel, ProcessingOptions, SelectionMode,
    DEFAULT_CONCURRENCY_LIMIT,
};
