//! Info command implementation

use anyhow::{Context, Result};
use lessonpack_core::inspect_package;
use serde::Serialize;
use std::path::Path;

/// Package info output
#[derive(Serialize)]
struct PackageInfo {
    package_id: String,
    format: String,
    version: u32,
    exported_at: String,
    kinds: Vec<String>,
    chapters: Vec<u32>,
    images: usize,
    diagrams: usize,
    assets: usize,
    questions: usize,
}

/// Display information about a teaching package
pub fn info(input: &Path, json: bool) -> Result<()> {
    let bytes = std::fs::read(input)
        .with_context(|| format!("Failed to open input file: {}", input.display()))?;

    let manifest = inspect_package(&bytes)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let info = PackageInfo {
        package_id: manifest.package_id.to_string(),
        format: manifest.format.clone(),
        version: manifest.version,
        exported_at: manifest.exported_at.to_rfc3339(),
        kinds: manifest.kinds.iter().cloned().collect(),
        chapters: manifest.chapters.keys().copied().collect(),
        images: manifest.stats.images,
        diagrams: manifest.stats.diagrams,
        assets: manifest.stats.assets,
        questions: manifest.stats.questions,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        let chapters: Vec<String> = info.chapters.iter().map(|id| id.to_string()).collect();
        println!("Package:     {}", info.package_id);
        println!("Format:      {} v{}", info.format, info.version);
        println!("Exported:    {}", info.exported_at);
        println!("Kinds:       {}", info.kinds.join(", "));
        println!("Chapters:    {}", chapters.join(", "));
        println!("Images:      {}", info.images);
        println!("Diagrams:    {}", info.diagrams);
        println!("Assets:      {}", info.assets);
        println!("Questions:   {}", info.questions);
    }

    Ok(())
}
