//! The five content slices and the per-chapter view assembled from them

use super::{ChapterId, ChapterResources, Course, ImageRef, Quiz};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

pub type ImageMap = BTreeMap<ChapterId, Vec<ImageRef>>;
pub type HtmlMap = BTreeMap<ChapterId, String>;
pub type ResourceMap = BTreeMap<ChapterId, ChapterResources>;
pub type QuizMap = BTreeMap<ChapterId, Quiz>;

/// One of the five independently persisted content kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Images,
    Diagrams,
    Html,
    Resources,
    Quizzes,
}

impl ContentKind {
    pub const ALL: [ContentKind; 5] = [
        ContentKind::Images,
        ContentKind::Diagrams,
        ContentKind::Html,
        ContentKind::Resources,
        ContentKind::Quizzes,
    ];

    /// Record name used by persistence and package manifests
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Images => "images",
            ContentKind::Diagrams => "diagrams",
            ContentKind::Html => "html",
            ContentKind::Resources => "resources",
            ContentKind::Quizzes => "quizzes",
        }
    }

    /// Position in [`ContentKind::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown content kind '{}'", s))
    }
}

/// All authored content, one mapping per kind.
///
/// Each field is loaded, saved and exported on its own, so any subset may be
/// empty without the others being affected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentSlices {
    #[serde(default)]
    pub images: ImageMap,
    #[serde(default)]
    pub diagrams: ImageMap,
    #[serde(default)]
    pub html: HtmlMap,
    #[serde(default)]
    pub resources: ResourceMap,
    #[serde(default)]
    pub quizzes: QuizMap,
}

impl ContentSlices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble the view of a single chapter
    pub fn chapter(&self, id: ChapterId) -> ChapterContent<'_> {
        ChapterContent {
            id,
            images: self.images.get(&id).map(Vec::as_slice).unwrap_or_default(),
            diagrams: self.diagrams.get(&id).map(Vec::as_slice).unwrap_or_default(),
            html: self.html.get(&id).map(String::as_str),
            resources: self.resources.get(&id),
            quiz: self.quizzes.get(&id),
        }
    }

    /// Every chapter id referenced by any slice
    pub fn chapter_ids(&self) -> BTreeSet<ChapterId> {
        self.images
            .keys()
            .chain(self.diagrams.keys())
            .chain(self.html.keys())
            .chain(self.resources.keys())
            .chain(self.quizzes.keys())
            .copied()
            .collect()
    }

    /// Chapter ids with content but no matching chapter in the course
    pub fn orphaned_chapters(&self, course: &Course) -> BTreeSet<ChapterId> {
        self.chapter_ids()
            .into_iter()
            .filter(|id| !course.contains(*id))
            .collect()
    }

    pub fn kind_is_empty(&self, kind: ContentKind) -> bool {
        match kind {
            ContentKind::Images => self.images.is_empty(),
            ContentKind::Diagrams => self.diagrams.is_empty(),
            ContentKind::Html => self.html.is_empty(),
            ContentKind::Resources => self.resources.is_empty(),
            ContentKind::Quizzes => self.quizzes.is_empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        ContentKind::ALL.iter().all(|kind| self.kind_is_empty(*kind))
    }

    /// Serialize one slice as a standalone JSON record
    pub fn encode_kind(&self, kind: ContentKind) -> serde_json::Result<Vec<u8>> {
        match kind {
            ContentKind::Images => serde_json::to_vec(&self.images),
            ContentKind::Diagrams => serde_json::to_vec(&self.diagrams),
            ContentKind::Html => serde_json::to_vec(&self.html),
            ContentKind::Resources => serde_json::to_vec(&self.resources),
            ContentKind::Quizzes => serde_json::to_vec(&self.quizzes),
        }
    }

    /// Replace one slice with a record produced by [`encode_kind`](Self::encode_kind).
    ///
    /// The slice is left untouched if the record does not parse.
    pub fn decode_kind(&mut self, kind: ContentKind, data: &[u8]) -> serde_json::Result<()> {
        match kind {
            ContentKind::Images => self.images = serde_json::from_slice(data)?,
            ContentKind::Diagrams => self.diagrams = serde_json::from_slice(data)?,
            ContentKind::Html => self.html = serde_json::from_slice(data)?,
            ContentKind::Resources => self.resources = serde_json::from_slice(data)?,
            ContentKind::Quizzes => self.quizzes = serde_json::from_slice(data)?,
        }
        Ok(())
    }
}

/// Read-only view of everything attached to one chapter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChapterContent<'a> {
    pub id: ChapterId,
    pub images: &'a [ImageRef],
    pub diagrams: &'a [ImageRef],
    pub html: Option<&'a str>,
    pub resources: Option<&'a ChapterResources>,
    pub quiz: Option<&'a Quiz>,
}

impl ChapterContent<'_> {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
            && self.diagrams.is_empty()
            && self.html.is_none()
            && self.resources.is_none()
            && self.quiz.is_none()
    }
}
