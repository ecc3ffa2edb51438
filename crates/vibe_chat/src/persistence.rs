//! Project persistence layer.
//!
//! Generated projects are stored in the workspace under:
//! `.vibe/projects/<projectId>.json`
//!
//! Each document holds the project metadata and its complete file set.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vibe_core::{CoreError, FileSet};

use crate::error::{ChatError, ChatResult};

/// Convert a string to a URL-safe slug
fn slugify(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Ids double as file names, so only a safe alphabet is accepted.
fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// A saved project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredProject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub files: FileSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl StoredProject {
    /// Create a project record with a fresh id derived from `name`.
    pub fn new(name: impl Into<String>, files: FileSet) -> Self {
        let name = name.into();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let slug = slugify(&name);
        let id = if slug.is_empty() {
            format!("project-{}", &suffix[..8])
        } else {
            format!("{}-{}", slug, &suffix[..8])
        };
        let now = Utc::now();

        Self {
            id,
            name,
            description: String::new(),
            files,
            created_at: now,
            updated_at: now,
            tags: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Summary of a stored project for listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub file_count: usize,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

/// Filesystem store for generated projects
#[derive(Debug, Clone)]
pub struct ProjectStore {
    /// Root path of the workspace
    workspace_root: PathBuf,
}

impl ProjectStore {
    /// Create a store for a workspace
    pub fn new(workspace_root: impl AsRef<Path>) -> Self {
        Self {
            workspace_root: workspace_root.as_ref().to_path_buf(),
        }
    }

    /// Get the workspace root path
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Get the projects directory for the workspace
    fn projects_dir(&self) -> PathBuf {
        self.workspace_root.join(".vibe").join("projects")
    }

    fn project_path(&self, id: &str) -> PathBuf {
        self.projects_dir().join(format!("{}.json", id))
    }

    /// Save a project, creating or replacing it.
    ///
    /// An existing record keeps its original `created_at`; `updated_at` is
    /// always set to now. Returns the record as written.
    pub fn save(&self, project: &StoredProject) -> ChatResult<StoredProject> {
        if !is_valid_id(&project.id) {
            return Err(CoreError::InvalidPath(project.id.clone()).into());
        }

        let mut record = project.clone();
        if let Ok(existing) = self.load(&project.id) {
            record.created_at = existing.created_at;
        }
        record.updated_at = Utc::now();

        fs::create_dir_all(self.projects_dir())?;
        let content = serde_json::to_string_pretty(&record)?;
        fs::write(self.project_path(&record.id), content)?;

        tracing::debug!("Saved project {} ({} files)", record.id, record.files.len());
        Ok(record)
    }

    /// Load a project by ID
    pub fn load(&self, id: &str) -> ChatResult<StoredProject> {
        let path = self.project_path(id);
        if !is_valid_id(id) || !path.exists() {
            return Err(ChatError::ProjectNotFound(id.to_string()));
        }

        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// List all projects, most recently updated first
    pub fn list(&self) -> ChatResult<Vec<ProjectSummary>> {
        let dir = self.projects_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut projects = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match self.load(id) {
                Ok(project) => projects.push(ProjectSummary {
                    id: project.id,
                    name: project.name,
                    description: project.description,
                    file_count: project.files.len(),
                    updated_at: project.updated_at,
                    tags: project.tags,
                }),
                Err(e) => tracing::warn!("Skipping unreadable project {}: {}", id, e),
            }
        }

        // Sort by updated_at descending
        projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(projects)
    }

    /// Delete a project
    pub fn delete(&self, id: &str) -> ChatResult<()> {
        let path = self.project_path(id);
        if !is_valid_id(id) || !path.exists() {
            return Err(ChatError::ProjectNotFound(id.to_string()));
        }

        fs::remove_file(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_files() -> FileSet {
        FileSet::new()
            .with_file("public/index.html", "<div id=\"root\"></div>")
            .unwrap()
            .with_file("src/App.jsx", "export default () => null;")
            .unwrap()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("My Todo App!"), "my-todo-app");
        assert_eq!(slugify("  --  "), "");
    }

    #[test]
    fn test_new_project_id() {
        let project = StoredProject::new("Weather Board", FileSet::new());
        assert!(project.id.starts_with("weather-board-"));
        assert!(is_valid_id(&project.id));

        let unnamed = StoredProject::new("???", FileSet::new());
        assert!(unnamed.id.starts_with("project-"));
    }

    #[test]
    fn test_save_and_load() {
        let temp = tempdir().unwrap();
        let store = ProjectStore::new(temp.path());

        let project = StoredProject::new("Timer", sample_files())
            .with_description("Pomodoro timer")
            .with_tags(vec!["multi-agent".to_string()]);
        let saved = store.save(&project).unwrap();

        assert!(temp
            .path()
            .join(".vibe/projects")
            .join(format!("{}.json", saved.id))
            .exists());

        let loaded = store.load(&saved.id).unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.files.len(), 2);
        assert_eq!(loaded.description, "Pomodoro timer");
    }

    #[test]
    fn test_update_preserves_created_at() {
        let temp = tempdir().unwrap();
        let store = ProjectStore::new(temp.path());

        let first = store.save(&StoredProject::new("Timer", sample_files())).unwrap();

        let mut changed = first.clone();
        changed.created_at = Utc::now() + chrono::Duration::days(1);
        changed.files = FileSet::new();
        let second = store.save(&changed).unwrap();

        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert!(store.load(&first.id).unwrap().files.is_empty());
    }

    #[test]
    fn test_list_most_recent_first() {
        let temp = tempdir().unwrap();
        let store = ProjectStore::new(temp.path());
        assert!(store.list().unwrap().is_empty());

        let older = store.save(&StoredProject::new("Older", sample_files())).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let newer = store.save(&StoredProject::new("Newer", FileSet::new())).unwrap();

        let list = store.list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, newer.id);
        assert_eq!(list[1].id, older.id);
        assert_eq!(list[1].file_count, 2);
    }

    #[test]
    fn test_delete_and_missing() {
        let temp = tempdir().unwrap();
        let store = ProjectStore::new(temp.path());
        let saved = store.save(&StoredProject::new("Gone", FileSet::new())).unwrap();

        store.delete(&saved.id).unwrap();
        assert!(matches!(store.load(&saved.id), Err(ChatError::ProjectNotFound(_))));
        assert!(matches!(store.delete(&saved.id), Err(ChatError::ProjectNotFound(_))));
    }

    #[test]
    fn test_rejects_unsafe_ids() {
        let temp = tempdir().unwrap();
        let store = ProjectStore::new(temp.path());

        let mut project = StoredProject::new("x", FileSet::new());
        project.id = "../escape".to_string();
        assert!(matches!(store.save(&project), Err(ChatError::Core(_))));
        assert!(matches!(store.load("../escape"), Err(ChatError::ProjectNotFound(_))));
    }
}
