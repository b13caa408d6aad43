//! Export command implementation

use super::spinner;
use crate::config::Config;
use anyhow::{Context, Result};
use std::path::Path;

/// Export all saved content to a teaching package
pub async fn export(config: &Config, output: &Path) -> Result<()> {
    let pb = spinner()?;

    pb.set_message("Loading saved content...");
    let workspace = config.open_workspace().await;

    pb.set_message("Encoding package...");
    let bytes = workspace.export().context("Failed to encode package")?;

    pb.set_message("Writing package...");
    std::fs::write(output, &bytes)
        .with_context(|| format!("Failed to write output file: {}", output.display()))?;

    let chapters = workspace.content().chapter_ids().len();
    workspace.close().await?;

    pb.finish_with_message(format!(
        "Exported {} chapters ({} bytes) -> {}",
        chapters,
        bytes.len(),
        output.display()
    ));

    Ok(())
}
