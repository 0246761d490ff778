//! Shared error types for the services crate.

use thiserror::Error;

use lms_core::model::EvaluationError;
use storage::repository::StorageError;

/// Errors emitted by `ScanService`.
///
/// Per-file and per-course anomalies are logged and skipped, not surfaced
/// here; only storage failures abort a scan.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScanServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CourseService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CourseServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ContentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to read content file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `EvaluationService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EvaluationServiceError {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `BookmarkService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BookmarkServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
