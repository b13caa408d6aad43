//! Per-kind content records on top of a [`StorageProvider`]

use super::{StorageProvider, StorageResult};
use crate::error::StorageError;
use crate::types::{ContentKind, ContentSlices};
use std::sync::Arc;

/// A kind that could not be loaded at startup
#[derive(Debug)]
pub struct LoadFailure {
    pub kind: ContentKind,
    pub error: StorageError,
}

/// Result of loading every kind
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Everything that loaded; failed or absent kinds are empty
    pub slices: ContentSlices,

    /// Kinds that had a stored record and loaded from it
    pub loaded: Vec<ContentKind>,

    /// Kinds whose record exists but could not be read or parsed
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Stores each content kind as one JSON record named after the kind.
///
/// Records are independent: a failed write or an unreadable record affects
/// only its own kind.
#[derive(Clone)]
pub struct PersistenceAdapter {
    provider: Arc<dyn StorageProvider>,
}

impl PersistenceAdapter {
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self { provider }
    }

    /// Storage key for a kind's record
    pub fn record_key(kind: ContentKind) -> String {
        format!("{}.json", kind.as_str())
    }

    /// Store the full mapping for `kind`, replacing the previous record
    pub async fn save(&self, kind: ContentKind, slices: &ContentSlices) -> StorageResult<()> {
        let data = slices
            .encode_kind(kind)
            .map_err(|e| StorageError::WriteFailed {
                kind,
                reason: e.to_string(),
            })?;
        self.save_record(kind, data).await
    }

    /// Store an already-encoded record for `kind`
    pub async fn save_record(&self, kind: ContentKind, data: Vec<u8>) -> StorageResult<()> {
        self.provider
            .write(&Self::record_key(kind), data)
            .await
            .map_err(|e| StorageError::WriteFailed {
                kind,
                reason: e.to_string(),
            })
    }

    /// Load the record for `kind` into `slices`.
    ///
    /// Returns `Ok(false)` when nothing is stored for the kind. On error the
    /// slice is left as it was.
    pub async fn load(&self, kind: ContentKind, slices: &mut ContentSlices) -> StorageResult<bool> {
        let data = match self.provider.read(&Self::record_key(kind)).await {
            Ok(data) => data,
            Err(StorageError::NotFound(_)) => return Ok(false),
            Err(e) => {
                return Err(StorageError::ReadFailed {
                    kind,
                    reason: e.to_string(),
                })
            }
        };

        slices
            .decode_kind(kind, &data)
            .map_err(|e| StorageError::Corrupt {
                kind,
                reason: e.to_string(),
            })?;
        Ok(true)
    }

    /// Load every kind. A failing kind stays empty and does not stop the rest.
    pub async fn load_all(&self) -> LoadReport {
        let mut report = LoadReport::default();

        for kind in ContentKind::ALL {
            match self.load(kind, &mut report.slices).await {
                Ok(true) => report.loaded.push(kind),
                Ok(false) => tracing::debug!("No stored {} record", kind),
                Err(error) => {
                    tracing::warn!("Failed to load {}, starting empty: {}", kind, error);
                    report.failures.push(LoadFailure { kind, error });
                }
            }
        }

        report
    }

    /// Delete the record for one kind. Deleting a missing record succeeds.
    pub async fn clear(&self, kind: ContentKind) -> StorageResult<()> {
        match self.provider.delete(&Self::record_key(kind)).await {
            Ok(()) | Err(StorageError::NotFound(_)) => Ok(()),
            Err(e) => Err(StorageError::WriteFailed {
                kind,
                reason: e.to_string(),
            }),
        }
    }

    /// Delete every record, attempting all kinds even if one fails
    pub async fn clear_all(&self) -> StorageResult<()> {
        let mut first_error = None;
        for kind in ContentKind::ALL {
            if let Err(e) = self.clear(kind).await {
                tracing::warn!("Failed to clear {}: {}", kind, e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::types::{ImageRef, Quiz};

    fn adapter() -> (Arc<MemoryStorage>, PersistenceAdapter) {
        let storage = Arc::new(MemoryStorage::new());
        (storage.clone(), PersistenceAdapter::new(storage))
    }

    #[tokio::test]
    async fn test_save_and_load_single_kind() {
        let (storage, adapter) = adapter();
        let mut slices = ContentSlices::new();
        slices.images.insert(1, vec![ImageRef::new("a.png")]);

        adapter.save(ContentKind::Images, &slices).await.unwrap();
        assert!(storage.exists("images.json").await.unwrap());
        assert!(!storage.exists("quizzes.json").await.unwrap());

        let mut loaded = ContentSlices::new();
        assert!(adapter.load(ContentKind::Images, &mut loaded).await.unwrap());
        assert!(!adapter.load(ContentKind::Quizzes, &mut loaded).await.unwrap());
        assert_eq!(loaded.images, slices.images);
    }

    #[tokio::test]
    async fn test_corrupt_record_does_not_block_others() {
        let (storage, adapter) = adapter();
        let mut slices = ContentSlices::new();
        slices.quizzes.insert(2, Quiz::new(2));
        adapter.save(ContentKind::Quizzes, &slices).await.unwrap();
        storage.write("html.json", b"{broken".to_vec()).await.unwrap();

        let report = adapter.load_all().await;
        assert_eq!(report.loaded, vec![ContentKind::Quizzes]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, ContentKind::Html);
        assert!(matches!(
            report.failures[0].error,
            StorageError::Corrupt { .. }
        ));
        assert!(report.slices.html.is_empty());
        assert_eq!(report.slices.quizzes, slices.quizzes);
    }

    #[tokio::test]
    async fn test_clear_all_tolerates_missing_records() {
        let (storage, adapter) = adapter();
        adapter
            .save(ContentKind::Html, &ContentSlices::new())
            .await
            .unwrap();

        adapter.clear_all().await.unwrap();
        assert!(storage.list("").await.unwrap().is_empty());
    }
}
