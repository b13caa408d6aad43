//! Error types for lessonpack core

use crate::types::{ChapterId, ContentKind};
use thiserror::Error;

/// Result type alias using LessonError
pub type Result<T> = std::result::Result<T, LessonError>;

/// Top-level error type for all lessonpack operations
#[derive(Debug, Error)]
pub enum LessonError {
    #[error("Package error: {0}")]
    Package(#[from] PackageError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal errors raised while reading or writing a teaching package.
///
/// Any of these aborts the import as a whole; live content is never touched
/// because decoding always happens into a staging value first.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("Malformed archive: {0}")]
    MalformedArchive(String),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Recoverable problems found while importing a package.
///
/// The import keeps going and the affected item is left out of the result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportWarning {
    #[error("chapter {chapter}: payload '{path}' is missing from the archive")]
    MissingPayload { chapter: ChapterId, path: String },

    #[error("chapter {chapter}: payload '{path}' could not be read: {reason}")]
    UnreadablePayload {
        chapter: ChapterId,
        path: String,
        reason: String,
    },

    #[error("chapter {chapter}: dropped quiz question {}: {reason}", question_label(.question_id))]
    InvalidQuestion {
        chapter: ChapterId,
        question_id: Option<u64>,
        reason: String,
    },

    #[error("chapter {chapter}: quiz declared chapter {found}, re-keyed to {chapter}")]
    ChapterMismatch { chapter: ChapterId, found: ChapterId },
}

fn question_label(id: &Option<u64>) -> String {
    id.map(|id| id.to_string())
        .unwrap_or_else(|| "<no id>".to_string())
}

/// Errors that occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("Failed to write {kind} record: {reason}")]
    WriteFailed { kind: ContentKind, reason: String },

    #[error("Failed to read {kind} record: {reason}")]
    ReadFailed { kind: ContentKind, reason: String },

    #[error("Stored {kind} record is corrupt: {reason}")]
    Corrupt { kind: ContentKind, reason: String },

    #[error("Write queue for {0} is closed")]
    QueueClosed(ContentKind),
}
