//! Lessonpack CLI - Command-line interface for lesson content and packages

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use lessonpack_core::Role;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lessonpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the saved content records
    #[arg(long, global = true, env = "LESSONPACK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Session role for edits (author, read-only)
    #[arg(long, global = true, default_value = "author")]
    role: Role,

    /// Chapter catalog to use instead of the built-in course
    #[arg(long, global = true)]
    course: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export all saved content to a teaching package
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import a teaching package, replacing all saved content
    Import {
        /// Package file path
        input: PathBuf,

        /// Only show what would be imported
        #[arg(long)]
        preview: bool,
    },

    /// Display information about a teaching package
    Info {
        /// Package file path
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a teaching package
    Validate {
        /// Package file path
        input: PathBuf,

        /// Fail on any dropped payload or unknown chapter
        #[arg(long)]
        strict: bool,
    },

    /// Show what is saved for each chapter
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add image files to a chapter's gallery
    AddImage {
        chapter: u32,

        /// Image files (png, jpg, gif, webp, svg)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Add image files to a chapter's visual aids
    AddDiagram {
        chapter: u32,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Move gallery images to the visual aids
    MoveToVisual {
        chapter: u32,

        /// Gallery positions, starting at 0
        #[arg(required = true)]
        indices: Vec<usize>,
    },

    /// Remove one gallery image
    RemoveImage {
        chapter: u32,

        /// Gallery position, starting at 0
        index: usize,
    },

    /// Set a chapter's lecture notes from an HTML file
    SetHtml { chapter: u32, file: PathBuf },

    /// Save a quiz from a JSON file
    SetQuiz { file: PathBuf },

    /// Erase all saved content
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "lessonpack_cli=debug,lessonpack_core=debug"
    } else {
        "lessonpack_cli=info,lessonpack_core=warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::resolve(cli.data_dir, cli.role, cli.course)?;

    match cli.command {
        Commands::Export { output } => commands::export(&config, &output).await,

        Commands::Import { input, preview } => commands::import(&config, &input, preview).await,

        Commands::Info { input, json } => commands::info(&input, json),

        Commands::Validate { input, strict } => commands::validate(&config, &input, strict),

        Commands::Status { json } => commands::status(&config, json).await,

        Commands::AddImage { chapter, files } => {
            commands::add_images(&config, chapter, &files, commands::Track::Gallery).await
        }

        Commands::AddDiagram { chapter, files } => {
            commands::add_images(&config, chapter, &files, commands::Track::Visual).await
        }

        Commands::MoveToVisual { chapter, indices } => {
            commands::move_to_visual(&config, chapter, indices).await
        }

        Commands::RemoveImage { chapter, index } => {
            commands::remove_image(&config, chapter, index).await
        }

        Commands::SetHtml { chapter, file } => commands::set_html(&config, chapter, &file).await,

        Commands::SetQuiz { file } => commands::set_quiz(&config, &file).await,

        Commands::Reset { yes } => commands::reset(&config, yes).await,
    }
}
