//! Teaching package manifest (`manifest.json`)

use crate::types::{ChapterId, ContentKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Path of the manifest inside the archive
pub const MANIFEST_PATH: &str = "manifest.json";

/// Value of the manifest `format` field
pub const FORMAT_NAME: &str = "lessonpack";

/// Newest manifest version this crate reads and the one it writes
pub const FORMAT_VERSION: u32 = 1;

/// Directory for binary image assets
pub const ASSET_DIR: &str = "assets";

/// Describes everything stored in a teaching package.
///
/// Unknown fields are ignored when reading, so newer exporters can add
/// metadata without breaking older importers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageManifest {
    pub format: String,
    pub version: u32,
    pub package_id: Uuid,
    pub exported_at: DateTime<Utc>,

    /// Content kinds included in the package, even if empty
    #[serde(default)]
    pub kinds: BTreeSet<String>,

    /// Per-chapter entries
    #[serde(default)]
    pub chapters: BTreeMap<ChapterId, ChapterEntry>,

    #[serde(default)]
    pub stats: PackageStats,
}

impl PackageManifest {
    pub fn new() -> Self {
        Self {
            format: FORMAT_NAME.to_string(),
            version: FORMAT_VERSION,
            package_id: Uuid::new_v4(),
            exported_at: Utc::now(),
            kinds: BTreeSet::new(),
            chapters: BTreeMap::new(),
            stats: PackageStats::default(),
        }
    }

    /// Whether the package declares `kind` as exported
    pub fn declares(&self, kind: ContentKind) -> bool {
        self.kinds.contains(kind.as_str())
    }

    /// Declared kinds this version understands
    pub fn known_kinds(&self) -> BTreeSet<ContentKind> {
        self.kinds.iter().filter_map(|k| k.parse().ok()).collect()
    }
}

impl Default for PackageManifest {
    fn default() -> Self {
        Self::new()
    }
}

/// What a single chapter contributes to the package
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChapterEntry {
    /// Gallery images, in order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageEntry>>,

    /// Visual-aid images, in order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagrams: Option<Vec<ImageEntry>>,

    /// Path of the lecture notes entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    /// Path of the resources entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz: Option<QuizEntry>,
}

/// Where an image's data lives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ImageEntry {
    /// Binary asset stored in the archive
    Asset { asset: String, mime: String },

    /// Reference kept verbatim (remote URL or non-canonical data URL)
    Inline { inline: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizEntry {
    pub path: String,

    /// Number of questions at export time
    pub questions: usize,
}

/// Summary counts, informational only
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageStats {
    #[serde(default)]
    pub chapters: usize,
    #[serde(default)]
    pub images: usize,
    #[serde(default)]
    pub diagrams: usize,
    #[serde(default)]
    pub assets: usize,
    #[serde(default)]
    pub questions: usize,
}

/// Entry path for a chapter's lecture notes
pub fn html_path(chapter: ChapterId) -> String {
    format!("html/{}.html", chapter)
}

/// Entry path for a chapter's resources
pub fn resources_path(chapter: ChapterId) -> String {
    format!("resources/{}.json", chapter)
}

/// Entry path for a chapter's quiz
pub fn quiz_path(chapter: ChapterId) -> String {
    format!("quizzes/{}.json", chapter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_entry_shapes() {
        let asset: ImageEntry =
            serde_json::from_str(r#"{"asset": "assets/ab.png", "mime": "image/png"}"#).unwrap();
        assert!(matches!(asset, ImageEntry::Asset { .. }));

        let inline: ImageEntry =
            serde_json::from_str(r#"{"inline": "https://example.com/x.png"}"#).unwrap();
        assert_eq!(
            inline,
            ImageEntry::Inline {
                inline: "https://example.com/x.png".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_fields_and_kinds_are_tolerated() {
        let json = r#"{
            "format": "lessonpack",
            "version": 1,
            "package_id": "12345678-1234-1234-1234-123456789abc",
            "exported_at": "2024-01-01T00:00:00Z",
            "kinds": ["images", "flashcards"],
            "chapters": {"3": {"html": "html/3.html", "flashcards": "x"}},
            "author": "someone"
        }"#;
        let manifest: PackageManifest = serde_json::from_str(json).unwrap();
        assert!(manifest.declares(ContentKind::Images));
        assert!(!manifest.declares(ContentKind::Quizzes));
        assert_eq!(
            manifest.known_kinds().into_iter().collect::<Vec<_>>(),
            vec![ContentKind::Images]
        );
        assert_eq!(manifest.chapters[&3].html.as_deref(), Some("html/3.html"));
    }

    #[test]
    fn test_chapter_entry_snapshot() {
        let entry = ChapterEntry {
            images: Some(vec![ImageEntry::Inline {
                inline: "a.png".to_string(),
            }]),
            diagrams: None,
            html: Some(html_path(2)),
            resources: None,
            quiz: Some(QuizEntry {
                path: quiz_path(2),
                questions: 3,
            }),
        };

        insta::assert_json_snapshot!(entry, @r###"
        {
          "images": [
            {
              "inline": "a.png"
            }
          ],
          "html": "html/2.html",
          "quiz": {
            "path": "quizzes/2.json",
            "questions": 3
          }
        }
        "###);
    }
}
