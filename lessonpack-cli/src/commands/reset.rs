//! Reset command implementation

use super::spinner;
use crate::config::Config;
use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Erase all saved content
pub async fn reset(config: &Config, yes: bool) -> Result<()> {
    if !yes && !confirm(&config.data_dir.display().to_string())? {
        println!("Aborted");
        return Ok(());
    }

    let pb = spinner()?;
    pb.set_message("Erasing saved content...");

    let mut workspace = config.open_workspace().await;
    workspace
        .factory_reset()
        .await
        .context("Failed to erase saved content")?;
    workspace.close().await?;

    pb.finish_with_message(format!("Erased all content in {}", config.data_dir.display()));
    Ok(())
}

fn confirm(location: &str) -> Result<bool> {
    print!("Erase all saved content in {}? [y/N] ", location);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
