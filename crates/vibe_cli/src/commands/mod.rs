//! CLI command definitions.
//!
//! This module defines the command structure for the vibeFactory CLI.
//! Each subcommand maps to one way of producing or managing a project.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use vibe_chat::{LlmAdapter, ProjectStore, StoredProject, TextProvider};
use vibe_core::FileSet;

pub mod build;
pub mod extract;
pub mod generate;
pub mod projects;

/// vibeFactory - AI app generation from a single prompt
#[derive(Parser)]
#[command(name = "vibe")]
#[command(version, about = "vibeFactory - AI app generation from a single prompt")]
#[command(long_about = r#"
vibeFactory turns a prompt into a small React project, either with a single
generating agent or with a five-agent pipeline (coordinator, architect,
frontend, backend, reviewer).

WORKFLOWS:
  generate  → Single agent, streamed reply, files re-extracted live
  build     → Five-agent pipeline with per-role progress
  extract   → Parse generated text into files
  projects  → List, show or delete saved projects

CONFIGURATION:
  Set OPENAI_API_KEY, ANTHROPIC_API_KEY or GEMINI_API_KEY.
  Optional: .vibe/settings.json, VIBE_PROVIDER, VIBE_LLM_MODEL, VIBE_BASE_URL.

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Generation failure
  4 - Provider not configured
  5 - Cancelled
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Workspace holding .vibe/ settings and saved projects
    #[arg(short, long, global = true, env = "VIBE_WORKSPACE", default_value = ".")]
    pub workspace: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a project with a single streaming agent
    Generate(generate::GenerateArgs),

    /// Build a project with the five-agent pipeline
    Build(build::BuildArgs),

    /// Extract files from generated text
    Extract(extract::ExtractArgs),

    /// Manage saved projects
    Projects(projects::ProjectsArgs),
}

/// Provider configured for the workspace.
pub fn provider_for(workspace: &Path) -> Result<Arc<dyn TextProvider>> {
    let adapter = LlmAdapter::from_workspace(workspace)?;
    info!("Using {} ({})", adapter.name(), adapter.model());
    Ok(Arc::new(adapter))
}

/// Cancellation token triggered by Ctrl-C.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping generation");
            trigger.cancel();
        }
    });
    token
}

/// Write files and/or save them as a project, as requested.
pub fn deliver(
    workspace: &Path,
    files: &FileSet,
    out: Option<&Path>,
    save: Option<&str>,
    description: &str,
) -> Result<()> {
    if let Some(dir) = out {
        let written = files
            .write_to(dir)
            .with_context(|| format!("Failed to write files to {}", dir.display()))?;
        println!("📁 Wrote {} files to {}", written, dir.display());
    }

    if let Some(name) = save {
        let store = ProjectStore::new(workspace);
        let project = StoredProject::new(name, files.clone()).with_description(description);
        let saved = store.save(&project).context("Failed to save project")?;
        println!("💾 Saved project {} ({})", saved.name, saved.id);
    }
    Ok(())
}

/// Print the file list of a project.
pub fn print_files(files: &FileSet) {
    for (path, artifact) in files {
        println!(
            "   {:<40} {:>10} {:>7} bytes",
            path,
            artifact.content_type.language(),
            artifact.content.len()
        );
    }
}
