//! Picora Processing Library
//!
//! This crate implements the bounded-concurrency media processing pipeline:
//! the leaf components (source reading, decoding, orientation correction,
//! compression, metadata extraction), the per-item pipeline that composes
//! them, and the batch coordinator that fans items out under a concurrency
//! budget.
//!
//! Data flows one way: [`BatchCoordinator`] → [`ItemPipeline`] → leaves →
//! result → coordinator → caller. Results are tagged with their input index
//! and the aggregate preserves input order, never completion order.

pub mod batch;
pub mod compression;
pub mod decode;
pub mod metadata;
pub mod orientation;
pub mod pipeline;
pub mod source;
pub mod validator;

// Re-export commonly used types
pub use batch::BatchCoordinator;
pub use compression::Compressor;
pub use decode::DecodedImage;
pub use metadata::MetadataExtractor;
pub use orientation::OrientationCorrector;
pub use pipeline::ItemPipeline;
pub use source::SourceReader;
pub use validator::MediaValidator;
