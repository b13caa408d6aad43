//! Import command implementation

use super::spinner;
use crate::config::Config;
use anyhow::{Context, Result};
use lessonpack_core::ImportedPackage;
use std::path::Path;

/// Import a teaching package, replacing all saved content
pub async fn import(config: &Config, input: &Path, preview: bool) -> Result<()> {
    let bytes = std::fs::read(input)
        .with_context(|| format!("Failed to open input file: {}", input.display()))?;

    let pb = spinner()?;
    pb.set_message("Loading saved content...");
    let mut workspace = config.open_workspace().await;

    pb.set_message("Decoding package...");
    let staged = workspace
        .import(&bytes)
        .with_context(|| format!("Failed to import {}", input.display()))?;
    pb.finish_and_clear();

    print_summary(&staged);

    if preview {
        println!("Preview only; saved content was not changed");
        workspace.close().await?;
        return Ok(());
    }

    workspace.commit(staged)?;
    workspace.close().await?;
    println!("Imported {}", input.display());

    Ok(())
}

fn print_summary(staged: &ImportedPackage) {
    let slices = &staged.slices;
    println!("Package:     {}", staged.manifest.package_id);
    println!("Exported:    {}", staged.manifest.exported_at.to_rfc3339());
    println!("Chapters:    {}", slices.chapter_ids().len());
    println!(
        "Images:      {}",
        slices.images.values().map(Vec::len).sum::<usize>()
    );
    println!(
        "Diagrams:    {}",
        slices.diagrams.values().map(Vec::len).sum::<usize>()
    );
    println!("Notes:       {}", slices.html.len());
    println!("Resources:   {}", slices.resources.len());
    println!(
        "Questions:   {}",
        slices
            .quizzes
            .values()
            .map(|q| q.questions.len())
            .sum::<usize>()
    );

    for warning in &staged.warnings {
        println!("Warning:     {}", warning);
    }
    if !staged.orphaned.is_empty() {
        let ids: Vec<String> = staged.orphaned.iter().map(|id| id.to_string()).collect();
        println!("Unknown chapters (kept, not shown): {}", ids.join(", "));
    }
}
