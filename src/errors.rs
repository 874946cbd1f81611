//! Typed error definitions for exif_sorter.
//! Provides a small set of well-known failure modes for better logs and tests.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SorterError {
    #[error("Source directory is missing, not a directory or unreadable: {0}")]
    SourceInvalid(PathBuf),

    #[error("Destination directory is missing, not a directory or not writable: {0}")]
    DestInvalid(PathBuf),

    #[error("Source and destination resolve to the same directory: {0}")]
    OverlappingDirs(PathBuf),

    #[error("No {0} given; pass it on the command line or set it in the config file")]
    MissingDirectory(&'static str),

    #[error("Batch size must be at least 1 (got {0})")]
    InvalidBatchSize(usize),

    #[error("Metadata backend '{backend}' is unavailable: {reason}")]
    MetadataUnavailable { backend: String, reason: String },

    #[error("Metadata backend '{backend}' failed for a batch of {files} files: {reason}")]
    MetadataBatch {
        backend: String,
        files: usize,
        reason: String,
    },

    #[error("Metadata extraction failed for all {batches} batches")]
    AllBatchesFailed { batches: usize },

    #[error("Operation interrupted by user")]
    Interrupted,
}

impl SorterError {
    /// Stable numeric code for structured logs and scripts.
    pub fn code(&self) -> u16 {
        match self {
            SorterError::SourceInvalid(_) => 10,
            SorterError::DestInvalid(_) => 11,
            SorterError::OverlappingDirs(_) => 12,
            SorterError::MissingDirectory(_) => 13,
            SorterError::InvalidBatchSize(_) => 14,
            SorterError::MetadataUnavailable { .. } => 20,
            SorterError::MetadataBatch { .. } => 21,
            SorterError::AllBatchesFailed { .. } => 22,
            SorterError::Interrupted => 130,
        }
    }

    /// Short machine-friendly label used as the `kind` log field.
    pub fn kind(&self) -> &'static str {
        match self {
            SorterError::SourceInvalid(_) => "source_invalid",
            SorterError::DestInvalid(_) => "dest_invalid",
            SorterError::OverlappingDirs(_) => "overlapping_dirs",
            SorterError::MissingDirectory(_) => "missing_directory",
            SorterError::InvalidBatchSize(_) => "invalid_batch_size",
            SorterError::MetadataUnavailable { .. } => "metadata_unavailable",
            SorterError::MetadataBatch { .. } => "metadata_batch",
            SorterError::AllBatchesFailed { .. } => "all_batches_failed",
            SorterError::Interrupted => "interrupted",
        }
    }
}
