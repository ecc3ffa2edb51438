//! Generate command - Single-agent streaming generation.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use tracing::{debug, info};

use vibe_chat::{GenerationSession, ProjectStore, SessionEvent};

use super::{cancel_on_ctrl_c, deliver, print_files, provider_for};

#[derive(Args)]
pub struct GenerateArgs {
    /// What to build, or what to change
    pub prompt: String,

    /// Continue from a saved project
    #[arg(short, long)]
    pub project: Option<String>,

    /// Write the generated files to this directory
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Save the result as a project with this name
    #[arg(short, long)]
    pub save: Option<String>,

    /// Do not echo the reply while it streams
    #[arg(long)]
    pub quiet: bool,
}

pub async fn execute(args: GenerateArgs, workspace: &Path) -> Result<()> {
    info!("Generating: {}", args.prompt);

    let provider = provider_for(workspace)?;
    let mut session = GenerationSession::new(provider);

    if let Some(id) = &args.project {
        let project = ProjectStore::new(workspace).load(id)?;
        info!("Continuing project {} ({} files)", project.name, project.files.len());
        session = session.with_files(project.files);
    }

    let cancel = cancel_on_ctrl_c();
    let quiet = args.quiet;
    let mut stderr = std::io::stderr();

    let reply = session
        .send(&args.prompt, &cancel, |event| match event {
            SessionEvent::Fragment(text) if !quiet => {
                let _ = write!(stderr, "{}", text);
                let _ = stderr.flush();
            }
            SessionEvent::Fragment(_) => {}
            SessionEvent::Files(files) => debug!("Project now has {} files", files.len()),
        })
        .await?;
    if !quiet {
        eprintln!();
    }

    if reply.cancelled {
        println!("⚠️  Generation cancelled, keeping the partial project");
    }

    let files = session.files();
    if files.is_empty() {
        println!("🤔 The reply contained no files");
        return Ok(());
    }

    println!("✅ Project has {} files:", files.len());
    print_files(files);

    deliver(workspace, files, args.out.as_deref(), args.save.as_deref(), &args.prompt)
}
