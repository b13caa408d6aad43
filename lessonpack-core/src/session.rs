//! Session context passed explicitly into core calls

use crate::types::ChapterId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the current user may do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Teacher: edits content, edits are persisted
    Author,

    /// Student: views content, never triggers automatic writes
    ReadOnly,
}

impl Role {
    pub fn can_write(&self) -> bool {
        matches!(self, Role::Author)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Author => "author",
            Role::ReadOnly => "read-only",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "author" | "teacher" => Ok(Role::Author),
            "read-only" | "readonly" | "student" => Ok(Role::ReadOnly),
            other => Err(format!(
                "unknown role '{}' (expected author or read-only)",
                other
            )),
        }
    }
}

/// The caller's session: role and the chapter being viewed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub role: Role,
    pub chapter_id: ChapterId,
}

impl Session {
    pub fn new(role: Role, chapter_id: ChapterId) -> Self {
        Self { role, chapter_id }
    }

    pub fn author(chapter_id: ChapterId) -> Self {
        Self::new(Role::Author, chapter_id)
    }

    pub fn read_only(chapter_id: ChapterId) -> Self {
        Self::new(Role::ReadOnly, chapter_id)
    }

    pub fn can_write(&self) -> bool {
        self.role.can_write()
    }

    /// Same session, looking at another chapter
    pub fn at_chapter(self, chapter_id: ChapterId) -> Self {
        Self { chapter_id, ..self }
    }
}
