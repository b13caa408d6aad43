//! Serialized, coalescing write queue with one worker per content kind.
//!
//! Writes for a kind are performed strictly in the order they were queued,
//! so a slow early write can never land after a newer one. When several
//! saves for the same kind are waiting, only the newest snapshot is written.
//! Flush and reset requests act as barriers: everything queued before them
//! is handled first, and a reset drops pending saves instead of writing them.

use super::{PersistenceAdapter, StorageResult};
use crate::error::StorageError;
use crate::session::Session;
use crate::types::{ContentKind, ContentSlices};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

/// Outcome notifications for the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistEvent {
    /// A record for the kind was written
    Saved { kind: ContentKind },

    /// Writing or clearing the kind failed; memory is still authoritative
    WriteFailed { kind: ContentKind, message: String },

    /// The kind's record was removed by a reset
    Cleared { kind: ContentKind },
}

enum Command {
    Save(Vec<u8>),
    Barrier(Barrier),
}

enum Barrier {
    Flush(oneshot::Sender<()>),
    Reset(oneshot::Sender<StorageResult<()>>),
}

/// Handle to the per-kind persistence workers
pub struct WriteQueue {
    senders: Vec<mpsc::UnboundedSender<Command>>,
    workers: Vec<JoinHandle<()>>,
    events: broadcast::Sender<PersistEvent>,
}

impl WriteQueue {
    /// Start one worker per kind. Must be called inside a Tokio runtime.
    pub fn spawn(adapter: PersistenceAdapter) -> Self {
        let (events, _) = broadcast::channel(64);
        let mut senders = Vec::with_capacity(ContentKind::ALL.len());
        let mut workers = Vec::with_capacity(ContentKind::ALL.len());

        for kind in ContentKind::ALL {
            let (tx, rx) = mpsc::unbounded_channel();
            let worker = Worker {
                kind,
                adapter: adapter.clone(),
                events: events.clone(),
            };
            workers.push(tokio::spawn(worker.run(rx)));
            senders.push(tx);
        }

        Self {
            senders,
            workers,
            events,
        }
    }

    /// Subscribe to save/failure notifications
    pub fn subscribe(&self) -> broadcast::Receiver<PersistEvent> {
        self.events.subscribe()
    }

    /// Reactive save after an edit. Read-only sessions never write.
    ///
    /// Returns whether a write was queued.
    pub fn auto_save(
        &self,
        session: &Session,
        kind: ContentKind,
        slices: &ContentSlices,
    ) -> StorageResult<bool> {
        if !session.can_write() {
            tracing::debug!("Skipping {} auto-save for read-only session", kind);
            return Ok(false);
        }
        self.persist(kind, slices)?;
        Ok(true)
    }

    /// Explicitly queue a save of `kind`, regardless of session role.
    ///
    /// The record is encoded now, so later edits to `slices` do not leak
    /// into this write.
    pub fn persist(&self, kind: ContentKind, slices: &ContentSlices) -> StorageResult<()> {
        let data = slices
            .encode_kind(kind)
            .map_err(|e| StorageError::WriteFailed {
                kind,
                reason: e.to_string(),
            })?;
        self.send(kind, Command::Save(data))
    }

    /// Wait until every write queued so far has completed
    pub async fn flush(&self) -> StorageResult<()> {
        let mut acks = Vec::with_capacity(self.senders.len());
        for kind in ContentKind::ALL {
            let (tx, rx) = oneshot::channel();
            self.send(kind, Command::Barrier(Barrier::Flush(tx)))?;
            acks.push((kind, rx));
        }
        for (kind, rx) in acks {
            rx.await.map_err(|_| StorageError::QueueClosed(kind))?;
        }
        Ok(())
    }

    /// Erase every stored record.
    ///
    /// The reset is queued behind all pending writes of each kind and
    /// supersedes any save still waiting, so nothing written before this call
    /// can reappear afterwards.
    pub async fn clear_all(&self) -> StorageResult<()> {
        let mut acks = Vec::with_capacity(self.senders.len());
        for kind in ContentKind::ALL {
            let (tx, rx) = oneshot::channel();
            self.send(kind, Command::Barrier(Barrier::Reset(tx)))?;
            acks.push((kind, rx));
        }

        let mut first_error = None;
        for (kind, rx) in acks {
            let result = rx.await.unwrap_or(Err(StorageError::QueueClosed(kind)));
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Drain every queue and stop the workers
    pub async fn shutdown(self) {
        let Self {
            senders, workers, ..
        } = self;
        drop(senders);
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!("Persistence worker panicked: {}", e);
            }
        }
    }

    fn send(&self, kind: ContentKind, command: Command) -> StorageResult<()> {
        self.senders[kind.index()]
            .send(command)
            .map_err(|_| StorageError::QueueClosed(kind))
    }
}

struct Worker {
    kind: ContentKind,
    adapter: PersistenceAdapter,
    events: broadcast::Sender<PersistEvent>,
}

impl Worker {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = rx.recv().await {
            let (mut latest, mut barrier) = match command {
                Command::Save(data) => (Some(data), None),
                Command::Barrier(barrier) => (None, Some(barrier)),
            };

            // Coalesce saves that piled up while the previous write ran
            while barrier.is_none() {
                match rx.try_recv() {
                    Ok(Command::Save(data)) => {
                        if latest.replace(data).is_some() {
                            tracing::debug!("Coalesced pending {} write", self.kind);
                        }
                    }
                    Ok(Command::Barrier(next)) => barrier = Some(next),
                    Err(_) => break,
                }
            }

            match barrier {
                Some(Barrier::Reset(ack)) => {
                    if latest.is_some() {
                        tracing::debug!("Pending {} write superseded by reset", self.kind);
                    }
                    let _ = ack.send(self.reset().await);
                }
                Some(Barrier::Flush(ack)) => {
                    if let Some(data) = latest {
                        self.write(data).await;
                    }
                    let _ = ack.send(());
                }
                None => {
                    if let Some(data) = latest {
                        self.write(data).await;
                    }
                }
            }
        }
        tracing::debug!("Persistence worker for {} stopped", self.kind);
    }

    async fn write(&self, data: Vec<u8>) {
        match self.adapter.save_record(self.kind, data).await {
            Ok(()) => {
                tracing::debug!("Saved {} record", self.kind);
                self.notify(PersistEvent::Saved { kind: self.kind });
            }
            Err(e) => {
                tracing::warn!("{}", e);
                self.notify(PersistEvent::WriteFailed {
                    kind: self.kind,
                    message: e.to_string(),
                });
            }
        }
    }

    async fn reset(&self) -> StorageResult<()> {
        let result = self.adapter.clear(self.kind).await;
        match &result {
            Ok(()) => self.notify(PersistEvent::Cleared { kind: self.kind }),
            Err(e) => {
                tracing::warn!("{}", e);
                self.notify(PersistEvent::WriteFailed {
                    kind: self.kind,
                    message: e.to_string(),
                });
            }
        }
        result
    }

    fn notify(&self, event: PersistEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
