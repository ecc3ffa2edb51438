//! Virtual multi-file project representation.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classify::{classify, ContentType};
use crate::error::{CoreError, CoreResult};

/// A single generated file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileArtifact {
    /// Content type derived from the path
    #[serde(rename = "contentType")]
    pub content_type: ContentType,
    /// File body
    pub content: String,
}

impl FileArtifact {
    /// Create an artifact with an explicit content type.
    pub fn new(content_type: ContentType, content: impl Into<String>) -> Self {
        Self {
            content_type,
            content: content.into(),
        }
    }

    /// Create an artifact whose content type is classified from `path`.
    pub fn for_path(path: &str, content: impl Into<String>) -> Self {
        Self::new(classify(path), content)
    }
}

/// Mapping of relative path to generated file.
///
/// Keys are always normalised relative paths (see [`normalize_path`]), so two
/// spellings of the same file never coexist.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FileSet {
    files: BTreeMap<String, FileArtifact>,
}

impl FileSet {
    /// Create an empty file set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file, replacing any previous artifact at the same path.
    ///
    /// Returns the replaced artifact, or an error if the path is not a
    /// well-formed relative path.
    pub fn insert(
        &mut self,
        path: &str,
        artifact: FileArtifact,
    ) -> CoreResult<Option<FileArtifact>> {
        let key = normalize_path(path).ok_or_else(|| CoreError::InvalidPath(path.to_string()))?;
        Ok(self.files.insert(key, artifact))
    }

    /// Builder-style insert that classifies the content type from the path.
    pub fn with_file(mut self, path: &str, content: impl Into<String>) -> CoreResult<Self> {
        let artifact = FileArtifact::for_path(path, content);
        self.insert(path, artifact)?;
        Ok(self)
    }

    /// Insert under a key that is already normalised.
    pub(crate) fn insert_normalized(&mut self, key: String, artifact: FileArtifact) {
        self.files.insert(key, artifact);
    }

    /// Get the artifact at `path`.
    pub fn get(&self, path: &str) -> Option<&FileArtifact> {
        self.files.get(path)
    }

    /// Whether a file exists at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the set holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// All paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Iterate over `(path, artifact)` pairs in sorted path order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, FileArtifact> {
        self.files.iter()
    }

    /// Union `other` into `self`; files in `other` win on path collision.
    pub fn merge(&mut self, other: FileSet) {
        self.files.extend(other.files);
    }

    /// Write every file below `dir`, creating parent directories as needed.
    ///
    /// Returns the number of files written.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> CoreResult<usize> {
        let dir = dir.as_ref();
        // Keys can bypass `insert` through deserialisation.
        if let Some(bad) = self
            .files
            .keys()
            .find(|path| normalize_path(path).as_deref() != Some(path.as_str()))
        {
            return Err(CoreError::InvalidPath(bad.clone()));
        }

        for (path, artifact) in &self.files {
            let target = dir.join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, &artifact.content)?;
            tracing::debug!(path = %path, bytes = artifact.content.len(), "wrote artifact");
        }
        Ok(self.files.len())
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = (&'a String, &'a FileArtifact);
    type IntoIter = btree_map::Iter<'a, String, FileArtifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

impl IntoIterator for FileSet {
    type Item = (String, FileArtifact);
    type IntoIter = btree_map::IntoIter<String, FileArtifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

/// Normalise a generated path into a relative, `/`-separated key.
///
/// Surrounding quotes or back-ticks, leading `/` and `./`, empty and `.`
/// segments are dropped. Returns `None` for empty paths and for any path
/// containing a `..` segment.
pub fn normalize_path(raw: &str) -> Option<String> {
    let cleaned = raw
        .trim()
        .trim_matches(|c| c == '`' || c == '"' || c == '\'')
        .replace('\\', "/");

    let mut segments = Vec::new();
    for segment in cleaned.split('/') {
        match segment.trim() {
            "" | "." => continue,
            ".." => return None,
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}
