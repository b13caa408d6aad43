//! Durable key-value storage for content records
//!
//! [`StorageProvider`] is the byte-level backend. [`PersistenceAdapter`]
//! maps the five content kinds onto it, and [`WriteQueue`] serializes writes
//! per kind.

mod persistence;
mod queue;

pub use persistence::{LoadFailure, LoadReport, PersistenceAdapter};
pub use queue::{PersistEvent, WriteQueue};

use crate::error::StorageError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Abstract key-value backend
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Read the value stored under `key`
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Store `data` under `key`, replacing any previous value
    async fn write(&self, key: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Delete the value stored under `key`
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// List keys starting with `prefix`
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Check if a key exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;
}

/// Local filesystem storage, one file per key
pub struct LocalStorage {
    root: std::path::PathBuf,
}

impl LocalStorage {
    /// Create a new local storage provider with the given root directory
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Safely resolve a key, preventing path traversal attacks
    fn full_path(&self, key: &str) -> StorageResult<std::path::PathBuf> {
        use std::path::Component;

        let mut normalized = std::path::PathBuf::new();
        for component in std::path::Path::new(key).components() {
            match component {
                Component::Normal(c) => normalized.push(c),
                Component::CurDir => {}
                Component::ParentDir | Component::Prefix(_) | Component::RootDir => {
                    return Err(StorageError::BackendError(
                        "Path traversal attempt detected".to_string(),
                    ));
                }
            }
        }

        Ok(self.root.join(normalized))
    }
}

fn io_error(key: &str, e: std::io::Error) -> StorageError {
    if e.kind() == std::io::ErrorKind::NotFound {
        StorageError::NotFound(key.to_string())
    } else {
        StorageError::BackendError(format!("{}: {}", key, e))
    }
}

#[async_trait]
impl StorageProvider for LocalStorage {
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        let full_path = self.full_path(key)?;
        tokio::fs::read(full_path).await.map_err(|e| io_error(key, e))
    }

    /// Writes go to a temp file first and are renamed into place, so a
    /// crash mid-write never leaves a truncated record behind.
    async fn write(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        let full_path = self.full_path(key)?;
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(key, e))?;
        }

        let mut temp_name = full_path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = std::path::PathBuf::from(temp_name);

        tokio::fs::write(&temp_path, data)
            .await
            .map_err(|e| io_error(key, e))?;
        tokio::fs::rename(&temp_path, &full_path)
            .await
            .map_err(|e| io_error(key, e))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let full_path = self.full_path(key)?;
        tokio::fs::remove_file(full_path)
            .await
            .map_err(|e| io_error(key, e))
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut entries = Vec::new();
        let mut read_dir = match tokio::fs::read_dir(&self.root).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
            Err(e) => return Err(io_error(prefix, e)),
        };

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| io_error(prefix, e))?
        {
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with(prefix) && !name.ends_with(".tmp") {
                    entries.push(name.to_string());
                }
            }
        }
        entries.sort();
        Ok(entries)
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let full_path = self.full_path(key)?;
        tokio::fs::try_exists(full_path)
            .await
            .map_err(|e| io_error(key, e))
    }
}

/// In-memory storage provider (for testing)
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageProvider for MemoryStorage {
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.data
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn write(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        self.data.write().await.insert(key.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.data
            .write()
            .await
            .remove(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .data
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.data.read().await.contains_key(key))
    }
}
