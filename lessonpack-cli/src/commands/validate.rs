//! Validate command implementation

use crate::config::Config;
use anyhow::{bail, Context, Result};
use lessonpack_core::import_package;
use std::path::Path;

/// Validate a teaching package
pub fn validate(config: &Config, input: &Path, strict: bool) -> Result<()> {
    let bytes = std::fs::read(input)
        .with_context(|| format!("Failed to open input file: {}", input.display()))?;

    let imported = match import_package(&bytes, &config.course) {
        Ok(imported) => imported,
        Err(e) => {
            eprintln!("Invalid teaching package: {}", e);
            bail!("Validation failed for {}", input.display());
        }
    };

    println!("Valid teaching package");
    println!("  Chapters: {}", imported.slices.chapter_ids().len());
    for warning in &imported.warnings {
        println!("  Warning: {}", warning);
    }
    for chapter in &imported.orphaned {
        println!("  Warning: chapter {} is not part of the course", chapter);
    }

    if strict && !imported.is_clean() {
        bail!(
            "Strict validation failed for {}: {} dropped payloads, {} unknown chapters",
            input.display(),
            imported.warnings.len(),
            imported.orphaned.len()
        );
    }

    Ok(())
}
