//! Error types for the segmentation engine

use thiserror::Error;

/// Errors that can occur while loading tables or producing artifacts.
///
/// Cell-level coercion failures are not represented here: the normalizer
/// degrades unparsable timestamps to `None` and unparsable numerics to `0.0`
/// instead of failing the run.
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("Failed to decode input as UTF-8 or Shift-JIS")]
    Decode,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required column missing from input table: {0}")]
    MissingColumn(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}
