//! Static course definition: chapters and their key points

use serde::{Deserialize, Serialize};

/// Chapter identifier. Positive, stable ordering 1..N.
pub type ChapterId = u32;

/// Layout used to render a chapter's key points
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VisualType {
    Tree,
    Flow,
    Comparison,
    Steps,
    Cycle,
    Clock,
}

/// A concept highlighted in a chapter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyPoint {
    /// Concept label
    pub concept: String,

    /// Short definition of the concept
    pub definition: String,

    /// Optional icon name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A predefined chapter of the course
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: ChapterId,
    pub title_burmese: String,
    pub title_english: String,
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<KeyPoint>,
    pub visual_type: VisualType,

    /// Raw source text of the chapter
    #[serde(default)]
    pub content: String,
}

/// The ordered, immutable list of chapters content can attach to.
///
/// Content slices reference chapters by id only. Ids that are not part of
/// the course are kept but never rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    chapters: Vec<Chapter>,
}

const BUILTIN_COURSE: &str = include_str!("../../data/course.json");

impl Course {
    /// Build a course from a chapter list, ordered by id
    pub fn new(mut chapters: Vec<Chapter>) -> Self {
        chapters.sort_by_key(|c| c.id);
        chapters.dedup_by_key(|c| c.id);
        Self { chapters }
    }

    /// The chapter catalog shipped with the application
    pub fn builtin() -> Self {
        // The embedded catalog is covered by tests; an empty course is the
        // only sensible fallback if it ever fails to parse.
        Self::from_json(BUILTIN_COURSE.as_bytes()).unwrap_or_else(|e| {
            tracing::error!("Built-in course catalog is invalid: {}", e);
            Self::new(Vec::new())
        })
    }

    /// Parse a course from a JSON array of chapters
    pub fn from_json(data: &[u8]) -> serde_json::Result<Self> {
        let chapters: Vec<Chapter> = serde_json::from_slice(data)?;
        Ok(Self::new(chapters))
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn get(&self, id: ChapterId) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: ChapterId) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = ChapterId> + '_ {
        self.chapters.iter().map(|c| c.id)
    }

    /// First chapter id, used as the landing chapter
    pub fn first_id(&self) -> Option<ChapterId> {
        self.chapters.first().map(|c| c.id)
    }

    /// The chapter following `id`, if any
    pub fn next(&self, id: ChapterId) -> Option<ChapterId> {
        self.ids().find(|&other| other > id)
    }

    /// The chapter preceding `id`, if any
    pub fn previous(&self, id: ChapterId) -> Option<ChapterId> {
        self.ids().filter(|&other| other < id).last()
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

impl Default for Course {
    fn default() -> Self {
        Self::builtin()
    }
}
