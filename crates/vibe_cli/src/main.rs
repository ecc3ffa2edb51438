//! vibeFactory CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Generation failure
//! - 4: Provider not configured
//! - 5: Cancelled

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vibe_chat::ChatError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const GENERATION_FAILURE: u8 = 3;
    pub const NOT_CONFIGURED: u8 = 4;
    pub const CANCELLED: u8 = 5;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let default_directive = if cli.verbose { "vibe=debug,warn" } else { "vibe=info,warn" };
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)))
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let workspace = cli.workspace.clone();
    let result = match cli.command {
        Commands::Generate(args) => commands::generate::execute(args, &workspace).await,
        Commands::Build(args) => commands::build::execute(args, &workspace).await,
        Commands::Extract(args) => commands::extract::execute(args).await,
        Commands::Projects(args) => commands::projects::execute(args, &workspace).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            // Determine appropriate exit code based on error
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(chat_error) = e.downcast_ref::<ChatError>() {
        return match chat_error {
            ChatError::LlmNotConfigured | ChatError::InvalidConfig(_) => ExitCodes::NOT_CONFIGURED,
            ChatError::Cancelled => ExitCodes::CANCELLED,
            ChatError::ProjectNotFound(_) => ExitCodes::INVALID_ARGS,
            _ => ExitCodes::GENERATION_FAILURE,
        };
    }

    let msg = e.to_string().to_lowercase();
    if msg.contains("cancelled") {
        ExitCodes::CANCELLED
    } else if msg.contains("generation") || msg.contains("pipeline") {
        ExitCodes::GENERATION_FAILURE
    } else if msg.contains("argument") || msg.contains("not found") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_chat_errors() {
        let e = anyhow::Error::new(ChatError::LlmNotConfigured);
        assert_eq!(categorize_error(&e), ExitCodes::NOT_CONFIGURED);

        let e = anyhow::Error::new(ChatError::Cancelled).context("Generation stopped");
        assert_eq!(categorize_error(&e), ExitCodes::CANCELLED);

        let e = anyhow::Error::new(ChatError::ProjectNotFound("x".to_string()));
        assert_eq!(categorize_error(&e), ExitCodes::INVALID_ARGS);
    }

    #[test]
    fn test_categorize_messages() {
        assert_eq!(
            categorize_error(&anyhow::anyhow!("Pipeline failed: boom")),
            ExitCodes::GENERATION_FAILURE
        );
        assert_eq!(
            categorize_error(&anyhow::anyhow!("File not found: a.txt")),
            ExitCodes::INVALID_ARGS
        );
        assert_eq!(categorize_error(&anyhow::anyhow!("disk full")), ExitCodes::GENERAL_ERROR);
    }
}
