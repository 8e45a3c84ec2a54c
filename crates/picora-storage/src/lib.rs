//! Picora Storage Library
//!
//! This crate provides the artifact persistence seam for the picora media
//! processing pipeline: the [`ArtifactStore`] trait and the scratch-directory
//! implementation ([`ScratchStore`]).
//!
//! # Artifact key format
//!
//! Keys are flat, collision-free file names generated per persist call:
//! `{sanitized_stem}_{yyyyMMdd_HHmmss}_{uuid}.{ext}`. Generation needs no
//! lock and stays unique across process restarts. Keys must not contain
//! path separators, `..`, or a leading `/`; key generation is centralized in
//! the `names` module so every store stays consistent.

pub mod names;
pub mod scratch;
pub mod traits;

// Re-export commonly used types
pub use scratch::ScratchStore;
pub use traits::{ArtifactStore, StorageError, StorageResult, StoredArtifact};
