//! Language classification for generated files.

use serde::{Deserialize, Serialize};

/// Content type of a generated file, derived from its extension.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// HTML documents
    Markup,
    /// Stylesheets
    Style,
    /// JavaScript / TypeScript sources, JSX included
    Script,
    /// Markdown documentation
    Doc,
    /// Structured data files
    Data,
    /// Anything else
    Plain,
}

impl ContentType {
    /// Editor language id for this content type.
    pub fn language(&self) -> &'static str {
        match self {
            Self::Markup => "html",
            Self::Style => "css",
            Self::Script => "javascript",
            Self::Doc => "markdown",
            Self::Data => "json",
            Self::Plain => "plaintext",
        }
    }
}

impl Default for ContentType {
    fn default() -> Self {
        Self::Plain
    }
}

/// Classify a path by its extension. Unknown extensions map to
/// [`ContentType::Plain`].
pub fn classify(path: &str) -> ContentType {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let extension = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => return ContentType::Plain,
    };

    match extension.as_str() {
        "html" | "htm" => ContentType::Markup,
        "css" | "scss" => ContentType::Style,
        "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" => ContentType::Script,
        "md" | "markdown" => ContentType::Doc,
        "json" => ContentType::Data,
        _ => ContentType::Plain,
    }
}
