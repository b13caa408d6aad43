//! Lessonpack Core Library
//!
//! This crate provides the content model, local persistence and teaching
//! package codec for a chapter-based lesson viewer. Teachers edit content
//! per chapter; the content is saved per kind to a key-value store and can be
//! exported to a single zip package that students import.

pub mod error;
pub mod package;
pub mod session;
pub mod storage;
pub mod store;
pub mod types;
pub mod workspace;

pub use error::{ImportWarning, LessonError, PackageError, Result, StorageError};
pub use package::{export_package, import_package, inspect_package, ImportedPackage};
pub use session::{Role, Session};
pub use store::{ContentStore, Mutation};
pub use types::{
    Chapter, ChapterContent, ChapterId, ChapterResources, ContentKind, ContentSlices, Course,
    ImageRef, Quiz, QuizQuestion, ResourceLink,
};
pub use workspace::Workspace;
