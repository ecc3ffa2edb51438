//! Built-in files that keep a generated project renderable.

use crate::classify::ContentType;
use crate::fileset::{FileArtifact, FileSet};

/// HTML entry point path.
pub const INDEX_HTML_PATH: &str = "public/index.html";
/// Base stylesheet path.
pub const STYLESHEET_PATH: &str = "src/index.css";
/// Project readme path.
pub const README_PATH: &str = "README.md";

pub const DEFAULT_INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Multi-Agent App</title>
  <script src="https://cdn.tailwindcss.com"></script>
  <script src="https://unpkg.com/react@18/umd/react.development.js"></script>
  <script src="https://unpkg.com/react-dom@18/umd/react-dom.development.js"></script>
  <script src="https://unpkg.com/@babel/standalone/babel.min.js"></script>
  <script src="https://unpkg.com/lucide@latest"></script>
</head>
<body>
  <div id="root"></div>
</body>
</html>"#;

pub const DEFAULT_STYLESHEET: &str = r#"@import url('https://fonts.googleapis.com/css2?family=Inter:wght@400;500;600;700&display=swap');

body {
  font-family: 'Inter', sans-serif;
  margin: 0;
  padding: 0;
}"#;

pub const DEFAULT_README: &str = "# Multi-Agent Generated Project\n\nGenerated by the vibeFactory multi-agent pipeline.";

/// Add the entry point, stylesheet and readme when missing.
///
/// Returns the paths that were filled in.
pub fn ensure_defaults(files: &mut FileSet) -> Vec<&'static str> {
    let defaults = [
        (INDEX_HTML_PATH, ContentType::Markup, DEFAULT_INDEX_HTML),
        (STYLESHEET_PATH, ContentType::Style, DEFAULT_STYLESHEET),
        (README_PATH, ContentType::Doc, DEFAULT_README),
    ];

    let mut added = Vec::new();
    for (path, content_type, content) in defaults {
        if !files.contains(path) {
            files.insert_normalized(path.to_string(), FileArtifact::new(content_type, content));
            added.push(path);
        }
    }
    added
}
