//! Persistence tests for lessonpack-core
//!
//! These tests drive the write queue and the persistence adapter against
//! storage backends that are slow, hung, failing or counting, to check
//! write ordering, role gating and reset behavior.

use async_trait::async_trait;
use lessonpack_core::error::StorageError;
use lessonpack_core::storage::{
    LocalStorage, MemoryStorage, PersistEvent, PersistenceAdapter, StorageProvider,
    StorageResult, WriteQueue,
};
use lessonpack_core::{
    ContentKind, ContentSlices, Course, ImageRef, Mutation, Quiz, QuizQuestion, Session,
    Workspace,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Test backends
// =============================================================================

/// Memory storage whose first write is slow and which counts writes
#[derive(Default)]
struct SlowFirstWrite {
    inner: MemoryStorage,
    writes: AtomicUsize,
}

#[async_trait]
impl StorageProvider for SlowFirstWrite {
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.inner.read(key).await
    }

    async fn write(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        if self.writes.fetch_add(1, Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        self.inner.write(key, data).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.inner.list(prefix).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }
}

/// Memory storage where writes to one key never complete
struct HungKey {
    inner: MemoryStorage,
    hung: String,
}

#[async_trait]
impl StorageProvider for HungKey {
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.inner.read(key).await
    }

    async fn write(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        if key == self.hung {
            std::future::pending::<()>().await;
        }
        self.inner.write(key, data).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.inner.list(prefix).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }
}

/// Storage that rejects every write, as a full disk would
struct ReadOnlyDisk;

#[async_trait]
impl StorageProvider for ReadOnlyDisk {
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        Err(StorageError::NotFound(key.to_string()))
    }

    async fn write(&self, key: &str, _data: Vec<u8>) -> StorageResult<()> {
        Err(StorageError::BackendError(format!("{}: quota exceeded", key)))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        Err(StorageError::NotFound(key.to_string()))
    }

    async fn list(&self, _prefix: &str) -> StorageResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn exists(&self, _key: &str) -> StorageResult<bool> {
        Ok(false)
    }
}

fn html(chapter: u32, body: &str) -> Mutation {
    Mutation::SetHtml {
        chapter,
        html: body.to_string(),
    }
}

async fn next_event(
    events: &mut tokio::sync::broadcast::Receiver<PersistEvent>,
) -> PersistEvent {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("timed out waiting for a persistence event")
        .expect("event channel closed")
}

// =============================================================================
// Loading
// =============================================================================

#[tokio::test]
async fn test_partial_load_leaves_missing_kinds_empty() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .write("images.json", br#"{"1": ["a.png", "b.png"]}"#.to_vec())
        .await
        .unwrap();
    storage
        .write(
            "quizzes.json",
            br#"{"2": {"chapterId": 2, "questions": []}}"#.to_vec(),
        )
        .await
        .unwrap();

    let report = PersistenceAdapter::new(storage).load_all().await;

    assert!(report.is_clean());
    assert_eq!(report.loaded, vec![ContentKind::Images, ContentKind::Quizzes]);
    assert_eq!(report.slices.images[&1].len(), 2);
    assert_eq!(report.slices.quizzes[&2], Quiz::new(2));
    assert!(report.slices.diagrams.is_empty());
    assert!(report.slices.html.is_empty());
    assert!(report.slices.resources.is_empty());
}

#[tokio::test]
async fn test_corrupt_record_fails_only_its_kind() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .write("html.json", b"<<not json>>".to_vec())
        .await
        .unwrap();
    storage
        .write("diagrams.json", br#"{"3": ["d.svg"]}"#.to_vec())
        .await
        .unwrap();

    let report = PersistenceAdapter::new(storage).load_all().await;

    assert_eq!(report.loaded, vec![ContentKind::Diagrams]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, ContentKind::Html);
    assert!(matches!(
        report.failures[0].error,
        StorageError::Corrupt { .. }
    ));
}

#[tokio::test]
async fn test_local_storage_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let adapter = PersistenceAdapter::new(Arc::new(LocalStorage::new(dir.path())));

    let mut ws = Workspace::open(adapter, Course::builtin()).await;
    let teacher = Session::author(1);
    ws.apply(
        &teacher,
        Mutation::AddImages {
            chapter: 1,
            images: vec![ImageRef::from_bytes("image/png", b"png")],
        },
    )
    .unwrap();
    ws.apply(
        &teacher,
        Mutation::SaveQuiz(
            Quiz::new(1).with_question(QuizQuestion::new(1, "Q", ["a", "b", "c", "d"], 0)),
        ),
    )
    .unwrap();
    let expected = ws.content().clone();
    ws.close().await.unwrap();

    let adapter = PersistenceAdapter::new(Arc::new(LocalStorage::new(dir.path())));
    let reopened = Workspace::open(adapter, Course::builtin()).await;
    assert_eq!(reopened.content(), &expected);
    assert!(reopened.load_failures().is_empty());
}

// =============================================================================
// Writing
// =============================================================================

#[tokio::test]
async fn test_later_write_wins_over_slow_earlier_write() {
    let storage = Arc::new(SlowFirstWrite::default());
    let adapter = PersistenceAdapter::new(storage.clone());
    let mut ws = Workspace::open(adapter.clone(), Course::builtin()).await;
    let teacher = Session::author(1);

    ws.apply(&teacher, html(1, "first")).unwrap();
    ws.apply(&teacher, html(1, "second")).unwrap();
    ws.apply(&teacher, html(1, "third")).unwrap();
    ws.flush().await.unwrap();

    let report = adapter.load_all().await;
    assert_eq!(report.slices.html[&1], "third");
    // The first write was in flight; the two behind it were coalesced
    assert!(storage.writes.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn test_read_only_session_never_writes() {
    let storage = Arc::new(SlowFirstWrite::default());
    let adapter = PersistenceAdapter::new(storage.clone());
    let mut ws = Workspace::open(adapter, Course::builtin()).await;
    let student = Session::read_only(1);

    ws.apply(&student, html(1, "scribble")).unwrap();
    ws.apply(
        &student,
        Mutation::AddImages {
            chapter: 2,
            images: vec![ImageRef::new("x.png")],
        },
    )
    .unwrap();
    ws.flush().await.unwrap();

    assert_eq!(storage.writes.load(Ordering::SeqCst), 0);
    assert_eq!(ws.content().html[&1], "scribble");
}

#[tokio::test]
async fn test_no_op_mutation_does_not_write() {
    let storage = Arc::new(SlowFirstWrite::default());
    let mut ws = Workspace::open(PersistenceAdapter::new(storage.clone()), Course::builtin()).await;

    let changed = ws
        .apply(
            &Session::author(1),
            Mutation::RemoveImage {
                chapter: 1,
                index: 5,
            },
        )
        .unwrap();
    ws.flush().await.unwrap();

    assert!(changed.is_empty());
    assert_eq!(storage.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_hung_kind_does_not_block_others() {
    let storage = Arc::new(HungKey {
        inner: MemoryStorage::new(),
        hung: "html.json".to_string(),
    });
    let queue = WriteQueue::spawn(PersistenceAdapter::new(storage.clone()));
    let mut events = queue.subscribe();

    let mut slices = ContentSlices::new();
    slices.html.insert(1, "stuck".to_string());
    slices.images.insert(1, vec![ImageRef::new("a.png")]);

    queue.persist(ContentKind::Html, &slices).unwrap();
    queue.persist(ContentKind::Images, &slices).unwrap();

    assert_eq!(
        next_event(&mut events).await,
        PersistEvent::Saved {
            kind: ContentKind::Images
        }
    );
    assert!(storage.inner.exists("images.json").await.unwrap());
    assert!(!storage.inner.exists("html.json").await.unwrap());
}

#[tokio::test]
async fn test_write_failure_is_reported_and_memory_kept() {
    let adapter = PersistenceAdapter::new(Arc::new(ReadOnlyDisk));
    let mut ws = Workspace::open(adapter, Course::builtin()).await;
    let mut events = ws.subscribe();

    ws.apply(&Session::author(2), html(2, "kept")).unwrap();

    match next_event(&mut events).await {
        PersistEvent::WriteFailed { kind, message } => {
            assert_eq!(kind, ContentKind::Html);
            assert!(message.contains("quota exceeded"));
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(ws.content().html[&2], "kept");
}

// =============================================================================
// Reset
// =============================================================================

#[tokio::test]
async fn test_reset_supersedes_pending_writes() {
    let storage = Arc::new(SlowFirstWrite::default());
    let adapter = PersistenceAdapter::new(storage.clone());
    let mut ws = Workspace::open(adapter.clone(), Course::builtin()).await;
    let teacher = Session::author(1);

    // First write is slow, so the rest pile up behind it
    ws.apply(&teacher, html(1, "one")).unwrap();
    ws.apply(&teacher, html(1, "two")).unwrap();
    ws.apply(
        &teacher,
        Mutation::AddImages {
            chapter: 1,
            images: vec![ImageRef::new("a.png")],
        },
    )
    .unwrap();

    ws.factory_reset().await.unwrap();
    ws.flush().await.unwrap();

    assert!(ws.content().is_empty());
    let report = adapter.load_all().await;
    assert!(report.loaded.is_empty(), "left behind: {:?}", report.loaded);
}

#[tokio::test]
async fn test_edits_after_reset_are_saved() {
    let storage = Arc::new(MemoryStorage::new());
    let adapter = PersistenceAdapter::new(storage);
    let mut ws = Workspace::open(adapter.clone(), Course::builtin()).await;
    let teacher = Session::author(4);

    ws.apply(&teacher, html(4, "old")).unwrap();
    ws.factory_reset().await.unwrap();
    ws.apply(&teacher, html(4, "new")).unwrap();
    ws.flush().await.unwrap();

    let report = adapter.load_all().await;
    assert_eq!(report.loaded, vec![ContentKind::Html]);
    assert_eq!(report.slices.html[&4], "new");
}
