//! Content editing commands

use crate::config::Config;
use anyhow::{bail, Context, Result};
use lessonpack_core::types::mime_for_extension;
use lessonpack_core::{ImageRef, Mutation, Quiz};
use std::path::{Path, PathBuf};

/// Which image track an upload goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    Gallery,
    Visual,
}

/// Read image files into data URLs and append them to a chapter
pub async fn add_images(
    config: &Config,
    chapter: u32,
    files: &[PathBuf],
    track: Track,
) -> Result<()> {
    let images = files
        .iter()
        .map(|path| read_image(path))
        .collect::<Result<Vec<_>>>()?;

    let mutation = match track {
        Track::Gallery => Mutation::AddImages { chapter, images },
        Track::Visual => Mutation::AddDiagrams {
            chapter,
            diagrams: images,
        },
    };
    apply(config, mutation).await
}

pub async fn move_to_visual(config: &Config, chapter: u32, indices: Vec<usize>) -> Result<()> {
    apply(config, Mutation::MoveToVisual { chapter, indices }).await
}

pub async fn remove_image(config: &Config, chapter: u32, index: usize) -> Result<()> {
    apply(config, Mutation::RemoveImage { chapter, index }).await
}

pub async fn set_html(config: &Config, chapter: u32, file: &Path) -> Result<()> {
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read HTML file: {}", file.display()))?;
    apply(config, Mutation::SetHtml { chapter, html }).await
}

/// Save a quiz; every question must be well formed
pub async fn set_quiz(config: &Config, file: &Path) -> Result<()> {
    let data = std::fs::read(file)
        .with_context(|| format!("Failed to read quiz file: {}", file.display()))?;
    let mut quiz: Quiz = serde_json::from_slice(&data)
        .with_context(|| format!("Invalid quiz file: {}", file.display()))?;

    let rejected = quiz.retain_valid();
    if !rejected.is_empty() {
        for (id, defect) in &rejected {
            eprintln!("Question {}: {}", id, defect);
        }
        bail!("{} invalid questions in {}", rejected.len(), file.display());
    }

    apply(config, Mutation::SaveQuiz(quiz)).await
}

async fn apply(config: &Config, mutation: Mutation) -> Result<()> {
    let chapter = mutation.chapter();
    if !config.course.contains(chapter) {
        tracing::warn!("Chapter {} is not part of the course", chapter);
    }

    let session = config.session(chapter);
    let mut workspace = config.open_workspace().await;
    let changed = workspace.apply(&session, mutation)?;
    workspace.close().await?;

    if changed.is_empty() {
        println!("Nothing changed");
    } else if !session.can_write() {
        println!("Read-only session: change was not saved");
    } else {
        let kinds: Vec<String> = changed.iter().map(|k| k.to_string()).collect();
        println!("Saved {} for chapter {}", kinds.join(", "), chapter);
    }

    Ok(())
}

fn read_image(path: &Path) -> Result<ImageRef> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .context("Could not determine image file extension")?;
    let mime = mime_for_extension(ext)
        .with_context(|| format!("Unsupported image type: .{}", ext))?;

    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read image file: {}", path.display()))?;
    Ok(ImageRef::from_bytes(mime, &data))
}
