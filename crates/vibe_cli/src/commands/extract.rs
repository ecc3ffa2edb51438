//! Extract command - Parse generated text into files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

#[derive(Args)]
pub struct ExtractArgs {
    /// Text file holding a generated reply
    pub file: PathBuf,

    /// Write the extracted files to this directory instead of printing JSON
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub async fn execute(args: ExtractArgs) -> Result<()> {
    info!("Extracting files from: {}", args.file.display());

    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("File not found: {}", args.file.display()))?;

    let Some(files) = vibe_core::extract(&text) else {
        anyhow::bail!("No files found in {}", args.file.display());
    };

    match args.out {
        Some(dir) => {
            let written = files.write_to(&dir)?;
            println!("📁 Wrote {} files to {}", written, dir.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&files)?),
    }
    Ok(())
}
