//! Status command implementation

use crate::config::Config;
use anyhow::Result;
use lessonpack_core::{ChapterContent, ChapterId, ContentKind};
use serde::Serialize;

#[derive(Serialize)]
struct ChapterStatus {
    id: ChapterId,
    title: Option<String>,
    images: usize,
    diagrams: usize,
    notes: bool,
    resources: bool,
    questions: usize,
}

impl ChapterStatus {
    fn new(content: ChapterContent<'_>, title: Option<String>) -> Self {
        Self {
            id: content.id,
            title,
            images: content.images.len(),
            diagrams: content.diagrams.len(),
            notes: content.html.is_some(),
            resources: content.resources.is_some(),
            questions: content.quiz.map_or(0, |q| q.questions.len()),
        }
    }
}

#[derive(Serialize)]
struct Status {
    data_dir: String,
    role: String,
    chapters: Vec<ChapterStatus>,

    /// Kinds that failed to load and started empty
    failed: Vec<ContentKind>,
}

/// Show what is saved for each chapter
pub async fn status(config: &Config, json: bool) -> Result<()> {
    let workspace = config.open_workspace().await;
    let slices = workspace.content();

    // Course chapters first, then any unknown ids that still carry content
    let mut chapters: Vec<ChapterStatus> = config
        .course
        .chapters()
        .iter()
        .map(|c| ChapterStatus::new(slices.chapter(c.id), Some(c.title_english.clone())))
        .collect();
    chapters.extend(
        slices
            .orphaned_chapters(&config.course)
            .into_iter()
            .map(|id| ChapterStatus::new(slices.chapter(id), None)),
    );

    let status = Status {
        data_dir: config.data_dir.display().to_string(),
        role: config.role.to_string(),
        chapters,
        failed: workspace.load_failures().iter().map(|f| f.kind).collect(),
    };
    let session = config.session(config.course.first_id().unwrap_or(1));
    let needs_import = workspace.needs_import(&session);
    workspace.close().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("Data directory: {}", status.data_dir);
    println!("Role:           {}", status.role);
    println!();
    println!(
        "{:>4}  {:<40} {:>6} {:>8} {:>5} {:>9} {:>9}",
        "ID", "Chapter", "Images", "Diagrams", "Notes", "Resources", "Questions"
    );
    for chapter in &status.chapters {
        println!(
            "{:>4}  {:<40} {:>6} {:>8} {:>5} {:>9} {:>9}",
            chapter.id,
            chapter.title.as_deref().unwrap_or("(unknown chapter)"),
            chapter.images,
            chapter.diagrams,
            if chapter.notes { "yes" } else { "-" },
            if chapter.resources { "yes" } else { "-" },
            chapter.questions
        );
    }
    for kind in &status.failed {
        println!("Warning: saved {} could not be loaded", kind);
    }
    if needs_import {
        println!();
        println!("No content yet. Import a teaching package with `lessonpack import <file>`.");
    }

    Ok(())
}
