//! Runtime configuration resolved from flags, environment and platform dirs

use anyhow::{Context, Result};
use directories::ProjectDirs;
use lessonpack_core::storage::{LocalStorage, PersistenceAdapter};
use lessonpack_core::{Course, Role, Session, Workspace};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Used when no platform data directory can be determined
const FALLBACK_DATA_DIR: &str = "lessonpack_data";

pub struct Config {
    pub data_dir: PathBuf,
    pub role: Role,
    pub course: Course,
}

impl Config {
    /// `data_dir` already includes `LESSONPACK_DATA_DIR` via clap
    pub fn resolve(data_dir: Option<PathBuf>, role: Role, course: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        tracing::debug!("Using data directory {}", data_dir.display());

        let course = match course {
            Some(path) => load_course(&path)?,
            None => Course::builtin(),
        };

        Ok(Self {
            data_dir,
            role,
            course,
        })
    }

    pub fn session(&self, chapter: u32) -> Session {
        Session::new(self.role, chapter)
    }

    /// Open the saved content in the data directory
    pub async fn open_workspace(&self) -> Workspace {
        let storage = LocalStorage::new(&self.data_dir);
        let adapter = PersistenceAdapter::new(Arc::new(storage));
        let workspace = Workspace::open(adapter, self.course.clone()).await;

        for failure in workspace.load_failures() {
            tracing::warn!(
                "Saved {} could not be loaded and will start empty: {}",
                failure.kind,
                failure.error
            );
        }
        workspace
    }
}

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("org", "lessonpack", "lessonpack")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
}

fn load_course(path: &Path) -> Result<Course> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read course file: {}", path.display()))?;
    let course = Course::from_json(&data)
        .with_context(|| format!("Invalid course file: {}", path.display()))?;
    if course.is_empty() {
        anyhow::bail!("Course file {} defines no chapters", path.display());
    }
    Ok(course)
}
