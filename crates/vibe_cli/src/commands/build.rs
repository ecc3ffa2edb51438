//! Build command - Five-agent pipeline generation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tracing::info;

use vibe_chat::{Orchestrator, OrchestratorConfig, PipelineRequest, ProjectStore};
use vibe_core::{project, render, RoleStatus};

use super::{cancel_on_ctrl_c, deliver, print_files, provider_for};

#[derive(Args)]
pub struct BuildArgs {
    /// What to build
    pub prompt: String,

    /// Rework a saved project
    #[arg(short, long)]
    pub project: Option<String>,

    /// Write the generated files to this directory
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Save the result as a project with this name
    #[arg(short, long)]
    pub save: Option<String>,

    /// Give up on a stage after this many seconds
    #[arg(long, value_name = "SECS")]
    pub stage_timeout: Option<u64>,
}

pub async fn execute(args: BuildArgs, workspace: &Path) -> Result<()> {
    info!("Building with the agent pipeline: {}", args.prompt);

    let mut config = OrchestratorConfig::default();
    if let Some(secs) = args.stage_timeout {
        config = config.with_stage_timeout(Duration::from_secs(secs));
    }

    let mut request = PipelineRequest::new(&args.prompt);
    if let Some(id) = &args.project {
        let saved = ProjectStore::new(workspace).load(id)?;
        info!("Reworking project {} ({} files)", saved.name, saved.files.len());
        request = request.with_context(format!(
            "Current project files:\n\n{}",
            render(&saved.files)
        ));
    }

    let orchestrator = Orchestrator::with_config(provider_for(workspace)?, config);
    let cancel = cancel_on_ctrl_c();

    let result = orchestrator
        .orchestrate(&request, &print_progress, &cancel)
        .await;

    if !result.success {
        anyhow::bail!("Pipeline failed: {}", result.summary);
    }

    println!("✅ {}", result.summary);
    for issue in &result.review.issues {
        println!("   ⚠️  [{}] {}: {}", issue.severity, issue.file, issue.issue);
    }
    print_files(&result.files);

    deliver(
        workspace,
        &result.files,
        args.out.as_deref(),
        args.save.as_deref(),
        &args.prompt,
    )
}

/// Print a progress tick with the projected state of every role.
fn print_progress(status: &str, overall: u8) {
    println!("[{:>3}%] {}", overall, status);
    for (role, progress) in &project(overall).per_role {
        let marker = match progress.status {
            RoleStatus::Idle => "·",
            RoleStatus::Working => "▶",
            RoleStatus::Done => "✓",
        };
        println!("       {} {:<20} {}", marker, role.display_name(), progress.task);
    }
}
