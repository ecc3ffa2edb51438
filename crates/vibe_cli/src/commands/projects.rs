//! Projects command - Manage saved projects.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Subcommand};

use vibe_chat::ProjectStore;

use super::print_files;

#[derive(Args)]
pub struct ProjectsArgs {
    #[command(subcommand)]
    pub command: ProjectsCommand,
}

#[derive(Subcommand)]
pub enum ProjectsCommand {
    /// List saved projects, most recent first
    List,

    /// Show a project's metadata and files
    Show {
        /// Project ID
        id: String,

        /// Write the project's files to this directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Delete a project
    Delete {
        /// Project ID
        id: String,
    },
}

pub async fn execute(args: ProjectsArgs, workspace: &Path) -> Result<()> {
    let store = ProjectStore::new(workspace);

    match args.command {
        ProjectsCommand::List => {
            let projects = store.list()?;
            if projects.is_empty() {
                println!("No saved projects");
                return Ok(());
            }
            for project in projects {
                println!(
                    "{:<32} {:<24} {:>3} files  {}",
                    project.id,
                    project.name,
                    project.file_count,
                    project.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        ProjectsCommand::Show { id, out } => {
            let project = store.load(&id)?;
            println!("📦 {} ({})", project.name, project.id);
            if !project.description.is_empty() {
                println!("   {}", project.description);
            }
            println!(
                "   created {}  updated {}",
                project.created_at.format("%Y-%m-%d %H:%M"),
                project.updated_at.format("%Y-%m-%d %H:%M")
            );
            if !project.tags.is_empty() {
                println!("   tags: {}", project.tags.join(", "));
            }
            print_files(&project.files);

            if let Some(dir) = out {
                let written = project.files.write_to(&dir)?;
                println!("📁 Wrote {} files to {}", written, dir.display());
            }
        }
        ProjectsCommand::Delete { id } => {
            store.delete(&id)?;
            println!("🗑️  Deleted project {}", id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibe_chat::{ChatError, StoredProject};
    use vibe_core::FileSet;

    #[tokio::test]
    async fn test_show_writes_files_and_delete_removes() {
        let temp = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(temp.path());
        let files = FileSet::new().with_file("README.md", "# hi").unwrap();
        let saved = store.save(&StoredProject::new("Readme", files)).unwrap();

        let out = temp.path().join("out");
        execute(
            ProjectsArgs {
                command: ProjectsCommand::Show {
                    id: saved.id.clone(),
                    out: Some(out.clone()),
                },
            },
            temp.path(),
        )
        .await
        .unwrap();
        assert_eq!(std::fs::read_to_string(out.join("README.md")).unwrap(), "# hi");

        execute(
            ProjectsArgs {
                command: ProjectsCommand::Delete { id: saved.id.clone() },
            },
            temp.path(),
        )
        .await
        .unwrap();
        assert!(matches!(store.load(&saved.id), Err(ChatError::ProjectNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_project() {
        let temp = tempfile::tempdir().unwrap();
        let err = execute(
            ProjectsArgs {
                command: ProjectsCommand::Delete { id: "nope".to_string() },
            },
            temp.path(),
        )
        .await
        .unwrap_err();
        assert!(err.downcast_ref::<ChatError>().is_some());
    }
}
