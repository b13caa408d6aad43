//! Live content bound to its persistence

use crate::error::Result;
use crate::package::{DecodeOptions, ImportedPackage, PackageDecoder, PackageEncoder};
use crate::session::Session;
use crate::storage::{LoadFailure, PersistEvent, PersistenceAdapter, WriteQueue};
use crate::store::{ContentStore, Mutation};
use crate::types::{ContentKind, ContentSlices, Course};
use tokio::sync::broadcast;

/// The content store, its write queue and the course it belongs to.
///
/// Every edit goes through [`Workspace::apply`], which persists the kinds
/// that changed when the session may write.
pub struct Workspace {
    store: ContentStore,
    queue: WriteQueue,
    course: Course,
    decode_options: DecodeOptions,
    load_failures: Vec<LoadFailure>,
}

impl Workspace {
    /// Load stored content and start the write queue.
    ///
    /// Kinds that fail to load start empty; see [`Workspace::load_failures`].
    pub async fn open(adapter: PersistenceAdapter, course: Course) -> Self {
        let report = adapter.load_all().await;
        tracing::debug!(
            "Opened workspace ({} kinds loaded, {} failed)",
            report.loaded.len(),
            report.failures.len()
        );

        Self {
            store: ContentStore::from_slices(report.slices),
            queue: WriteQueue::spawn(adapter),
            course,
            decode_options: DecodeOptions::default(),
            load_failures: report.failures,
        }
    }

    pub fn with_decode_options(mut self, options: DecodeOptions) -> Self {
        self.decode_options = options;
        self
    }

    pub fn content(&self) -> &ContentSlices {
        self.store.slices()
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    /// Kinds that could not be loaded when the workspace was opened
    pub fn load_failures(&self) -> &[LoadFailure] {
        &self.load_failures
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PersistEvent> {
        self.queue.subscribe()
    }

    /// Apply an edit and queue saves for every kind it changed
    pub fn apply(&mut self, session: &Session, mutation: Mutation) -> Result<Vec<ContentKind>> {
        let changed = self.store.apply(mutation);
        for &kind in &changed {
            self.queue.auto_save(session, kind, self.store.slices())?;
        }
        Ok(changed)
    }

    /// Encode the current content as a teaching package
    pub fn export(&self) -> Result<Vec<u8>> {
        Ok(PackageEncoder::new().encode(self.store.slices())?)
    }

    /// Decode a package without touching live content
    pub fn import(&self, bytes: &[u8]) -> Result<ImportedPackage> {
        let decoder = PackageDecoder::with_options(self.decode_options);
        Ok(decoder.decode(bytes, &self.course)?)
    }

    /// Replace live content with a staged import and persist every kind.
    ///
    /// Persisting here is explicit, so it happens for read-only sessions too.
    pub fn commit(&mut self, staged: ImportedPackage) -> Result<()> {
        let kinds = self.store.replace_all(staged.slices);
        for kind in kinds {
            self.queue.persist(kind, self.store.slices())?;
        }
        tracing::info!(
            "Committed package {} into the workspace",
            staged.manifest.package_id
        );
        Ok(())
    }

    /// Erase stored and live content.
    ///
    /// Storage is cleared behind any pending writes first. Memory is emptied
    /// even if clearing storage fails; the storage error is still returned.
    pub async fn factory_reset(&mut self) -> Result<()> {
        let cleared = self.queue.clear_all().await;
        self.store.clear();
        cleared?;
        tracing::info!("Factory reset complete");
        Ok(())
    }

    /// Whether a read-only session should be prompted to import a package
    pub fn needs_import(&self, session: &Session) -> bool {
        !session.can_write() && self.store.slices().is_empty()
    }

    /// Wait for every queued write
    pub async fn flush(&self) -> Result<()> {
        Ok(self.queue.flush().await?)
    }

    /// Flush and stop the persistence workers
    pub async fn close(self) -> Result<()> {
        self.queue.flush().await?;
        self.queue.shutdown().await;
        Ok(())
    }
}
