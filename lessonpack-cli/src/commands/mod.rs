//! CLI command implementations

mod edit;
mod export;
mod import;
mod info;
mod reset;
mod status;
mod validate;

pub use edit::{add_images, move_to_visual, remove_image, set_html, set_quiz, Track};
pub use export::export;
pub use import::import;
pub use info::info;
pub use reset::reset;
pub use status::status;
pub use validate::validate;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Animated spinner for steps that touch the disk
fn spinner() -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}
