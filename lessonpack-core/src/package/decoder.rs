//! Teaching package decoder
//!
//! Decoding is strict about the container and the manifest and lenient about
//! everything else: a missing or broken payload costs only that payload.

use super::manifest::{ImageEntry, PackageManifest, FORMAT_NAME, FORMAT_VERSION, MANIFEST_PATH};
use crate::error::{ImportWarning, PackageError};
use crate::types::{
    ChapterId, ChapterResources, ContentKind, ContentSlices, Course, ImageRef, Quiz, QuizQuestion,
};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::io::{Cursor, Read};
use zip::result::ZipError;
use zip::ZipArchive;

/// Limits applied while decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Largest uncompressed entry accepted, in bytes
    pub max_entry_bytes: u64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_entry_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Staged result of an import. Nothing has been persisted yet.
#[derive(Debug, Clone)]
pub struct ImportedPackage {
    pub manifest: PackageManifest,

    /// Decoded content, ready to replace the live store
    pub slices: ContentSlices,

    /// Kinds the package carries (declared or with data)
    pub kinds: BTreeSet<ContentKind>,

    /// Recoverable problems; the affected items were left out
    pub warnings: Vec<ImportWarning>,

    /// Chapter ids with content but no chapter in the course
    pub orphaned: BTreeSet<ChapterId>,
}

impl ImportedPackage {
    /// True when nothing was dropped and every chapter is known
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.orphaned.is_empty()
    }

    /// Whether the package included `kind` at all (possibly empty)
    pub fn has_kind(&self, kind: ContentKind) -> bool {
        self.kinds.contains(&kind)
    }
}

/// Quiz as found in a package, before per-question validation
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuiz {
    #[serde(default)]
    chapter_id: Option<ChapterId>,
    #[serde(default)]
    questions: Vec<serde_json::Value>,
}

type Archive<'a> = ZipArchive<Cursor<&'a [u8]>>;

/// Reads zip teaching packages back into [`ContentSlices`]
#[derive(Debug, Clone, Default)]
pub struct PackageDecoder {
    options: DecodeOptions,
}

impl PackageDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        Self { options }
    }

    /// Read and validate only the manifest
    pub fn read_manifest(&self, bytes: &[u8]) -> Result<PackageManifest, PackageError> {
        let mut archive = open(bytes)?;
        self.manifest(&mut archive)
    }

    /// Decode a whole package
    pub fn decode(&self, bytes: &[u8], course: &Course) -> Result<ImportedPackage, PackageError> {
        let mut archive = open(bytes)?;
        let manifest = self.manifest(&mut archive)?;

        let mut session = DecodeSession {
            archive,
            options: self.options,
            assets: HashMap::new(),
            warnings: Vec::new(),
        };

        let mut slices = ContentSlices::new();
        let mut kinds = manifest.known_kinds();

        for (&chapter, entry) in &manifest.chapters {
            if let Some(images) = &entry.images {
                slices
                    .images
                    .insert(chapter, session.images(chapter, images));
                kinds.insert(ContentKind::Images);
            }

            if let Some(diagrams) = &entry.diagrams {
                slices
                    .diagrams
                    .insert(chapter, session.images(chapter, diagrams));
                kinds.insert(ContentKind::Diagrams);
            }

            if let Some(path) = &entry.html {
                kinds.insert(ContentKind::Html);
                if let Some(html) = session.text(chapter, path) {
                    slices.html.insert(chapter, html);
                }
            }

            if let Some(path) = &entry.resources {
                kinds.insert(ContentKind::Resources);
                if let Some(resources) = session.json::<ChapterResources>(chapter, path) {
                    slices.resources.insert(chapter, resources);
                }
            }

            if let Some(quiz) = &entry.quiz {
                kinds.insert(ContentKind::Quizzes);
                if let Some(quiz) = session.quiz(chapter, &quiz.path) {
                    slices.quizzes.insert(chapter, quiz);
                }
            }
        }

        let orphaned = slices.orphaned_chapters(course);
        for chapter in &orphaned {
            tracing::warn!(
                "Chapter {} is not part of the course; its content is kept but hidden",
                chapter
            );
        }

        tracing::info!(
            "Imported package {} ({} chapters, {} warnings)",
            manifest.package_id,
            manifest.chapters.len(),
            session.warnings.len()
        );

        Ok(ImportedPackage {
            manifest,
            slices,
            kinds,
            warnings: session.warnings,
            orphaned,
        })
    }

    fn manifest(&self, archive: &mut Archive<'_>) -> Result<PackageManifest, PackageError> {
        let data = match read_limited(archive, MANIFEST_PATH, self.options.max_entry_bytes) {
            Ok(data) => data,
            Err(EntryError::Missing) => {
                return Err(PackageError::InvalidManifest(format!(
                    "{} not found",
                    MANIFEST_PATH
                )))
            }
            Err(EntryError::Unreadable(reason)) => {
                return Err(PackageError::InvalidManifest(reason))
            }
        };

        let manifest: PackageManifest = serde_json::from_slice(&data)
            .map_err(|e| PackageError::InvalidManifest(e.to_string()))?;

        if manifest.format != FORMAT_NAME {
            return Err(PackageError::InvalidManifest(format!(
                "unexpected format '{}'",
                manifest.format
            )));
        }
        if manifest.version == 0 || manifest.version > FORMAT_VERSION {
            return Err(PackageError::InvalidManifest(format!(
                "unsupported version {} (newest supported is {})",
                manifest.version, FORMAT_VERSION
            )));
        }

        Ok(manifest)
    }
}

fn open(bytes: &[u8]) -> Result<Archive<'_>, PackageError> {
    ZipArchive::new(Cursor::new(bytes)).map_err(|e| PackageError::MalformedArchive(e.to_string()))
}

#[derive(Debug, Clone)]
enum EntryError {
    Missing,
    Unreadable(String),
}

fn read_limited(archive: &mut Archive<'_>, path: &str, limit: u64) -> Result<Vec<u8>, EntryError> {
    let file = archive.by_name(path).map_err(|e| match e {
        ZipError::FileNotFound => EntryError::Missing,
        other => EntryError::Unreadable(other.to_string()),
    })?;

    if file.size() > limit {
        return Err(EntryError::Unreadable(format!(
            "entry is {} bytes, limit is {}",
            file.size(),
            limit
        )));
    }

    let mut data = Vec::with_capacity(file.size() as usize);
    file.take(limit + 1)
        .read_to_end(&mut data)
        .map_err(|e| EntryError::Unreadable(e.to_string()))?;
    if data.len() as u64 > limit {
        return Err(EntryError::Unreadable("entry exceeds size limit".to_string()));
    }
    Ok(data)
}

/// Mutable state for one decode: the open archive and collected warnings
struct DecodeSession<'a> {
    archive: Archive<'a>,
    options: DecodeOptions,

    /// Asset reads by path; images shared between chapters are read once
    assets: HashMap<String, Result<Vec<u8>, EntryError>>,
    warnings: Vec<ImportWarning>,
}

impl DecodeSession<'_> {
    fn warn(&mut self, warning: ImportWarning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Read an entry, recording a warning if it is missing or broken
    fn read(&mut self, chapter: ChapterId, path: &str) -> Option<Vec<u8>> {
        let result = read_limited(&mut self.archive, path, self.options.max_entry_bytes);
        self.take(chapter, path, result)
    }

    /// Unwrap an entry read, turning a failure into a warning for `chapter`
    fn take(
        &mut self,
        chapter: ChapterId,
        path: &str,
        result: Result<Vec<u8>, EntryError>,
    ) -> Option<Vec<u8>> {
        let warning = match result {
            Ok(data) => return Some(data),
            Err(EntryError::Missing) => ImportWarning::MissingPayload {
                chapter,
                path: path.to_string(),
            },
            Err(EntryError::Unreadable(reason)) => ImportWarning::UnreadablePayload {
                chapter,
                path: path.to_string(),
                reason,
            },
        };
        self.warn(warning);
        None
    }

    fn text(&mut self, chapter: ChapterId, path: &str) -> Option<String> {
        let data = self.read(chapter, path)?;
        match String::from_utf8(data) {
            Ok(text) => Some(text),
            Err(e) => {
                self.warn(ImportWarning::UnreadablePayload {
                    chapter,
                    path: path.to_string(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    fn json<T: serde::de::DeserializeOwned>(
        &mut self,
        chapter: ChapterId,
        path: &str,
    ) -> Option<T> {
        let data = self.read(chapter, path)?;
        match serde_json::from_slice(&data) {
            Ok(value) => Some(value),
            Err(e) => {
                self.warn(ImportWarning::UnreadablePayload {
                    chapter,
                    path: path.to_string(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    /// Rebuild an image sequence, skipping images whose asset is lost
    fn images(&mut self, chapter: ChapterId, entries: &[ImageEntry]) -> Vec<ImageRef> {
        let mut images = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                ImageEntry::Inline { inline } => images.push(ImageRef::new(inline.clone())),
                ImageEntry::Asset { asset, mime } => {
                    if let Some(data) = self.asset(chapter, asset) {
                        images.push(ImageRef::from_bytes(mime, &data));
                    }
                }
            }
        }
        images
    }

    /// Every image pointing at a lost asset gets the same warning as the first
    fn asset(&mut self, chapter: ChapterId, path: &str) -> Option<Vec<u8>> {
        let result = match self.assets.get(path).cloned() {
            Some(cached) => cached,
            None => {
                let result = read_limited(&mut self.archive, path, self.options.max_entry_bytes);
                self.assets.insert(path.to_string(), result.clone());
                result
            }
        };
        self.take(chapter, path, result)
    }

    /// Parse a quiz, keeping only questions that satisfy the invariants
    fn quiz(&mut self, chapter: ChapterId, path: &str) -> Option<Quiz> {
        let raw: RawQuiz = self.json(chapter, path)?;

        if let Some(found) = raw.chapter_id.filter(|&found| found != chapter) {
            self.warn(ImportWarning::ChapterMismatch { chapter, found });
        }

        let mut quiz = Quiz::new(chapter);
        for value in raw.questions {
            let question_id = value.get("id").and_then(serde_json::Value::as_u64);
            let question: QuizQuestion = match serde_json::from_value(value) {
                Ok(question) => question,
                Err(e) => {
                    self.warn(ImportWarning::InvalidQuestion {
                        chapter,
                        question_id,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match question.validate() {
                Ok(()) => quiz.questions.push(question),
                Err(defect) => self.warn(ImportWarning::InvalidQuestion {
                    chapter,
                    question_id: Some(question.id),
                    reason: defect.to_string(),
                }),
            }
        }
        Some(quiz)
    }
}
