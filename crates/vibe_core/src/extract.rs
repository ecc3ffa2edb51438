//! Artifact extraction from generated text.
//!
//! The extractor is a pure function of the text received so far and is meant
//! to be re-run on every streamed fragment. Two encodings are understood:
//!
//! - **Boundary markers**: a `FILE-BOUNDARY: <path>` line precedes each file
//!   body. Text before the first marker is discarded, a body may be wrapped
//!   in one fence which is stripped, and a path seen twice keeps its last body.
//!   A marker line still in flight (no newline, no `-->`) ends the previous
//!   body but names no file until it is complete.
//! - **Single markup fence** (no markers anywhere): the first fence tagged
//!   `html` becomes `public/index.html`. A closed fence wins over an open
//!   one; an open fence yields everything received after it, which is what
//!   makes partial streams renderable.
//!
//! ```text
//! Sure! Here is your app.
//! FILE-BOUNDARY: src/App.jsx
//! export default function App() { ... }
//! FILE-BOUNDARY: src/index.css
//! body { margin: 0; }
//! ```

use crate::classify::{classify, ContentType};
use crate::fileset::{normalize_path, FileArtifact, FileSet};

/// Token that opens a boundary marker line.
pub const BOUNDARY_MARKER: &str = "FILE-BOUNDARY:";

/// Path assigned to the artifact of a single markup fence.
pub const ENTRY_POINT: &str = "public/index.html";

const FENCE: &str = "```";
const MARKUP_TAG: &str = "html";

/// Extract the files contained in `buffer`.
///
/// Returns `None` when no artifact can be recognised yet.
pub fn extract(buffer: &str) -> Option<FileSet> {
    let boundaries = scan_boundaries(buffer);
    if boundaries.is_empty() {
        extract_single(buffer)
    } else {
        extract_multi(buffer, &boundaries)
    }
}

/// Render `files` in the boundary-marker encoding, each body fenced.
///
/// [`extract`] reads the result back into the same files.
pub fn render(files: &FileSet) -> String {
    let mut out = String::new();
    for (path, artifact) in files {
        out.push_str(&format!(
            "{} {}\n{}{}\n{}\n{}\n\n",
            BOUNDARY_MARKER,
            path,
            FENCE,
            artifact.content_type.language(),
            artifact.content,
            FENCE
        ));
    }
    out
}

/// Whether `buffer` uses boundary markers.
pub fn has_boundaries(buffer: &str) -> bool {
    buffer.lines().any(|line| parse_marker_line(line).is_some())
}

/// A boundary marker line located in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Boundary<'a> {
    /// Raw path text following the marker
    path: &'a str,
    /// Byte offset where the marker line starts
    line_start: usize,
    /// Byte offset just past the marker line
    body_start: usize,
    /// Whether the marker line has been fully received
    complete: bool,
}

fn scan_boundaries(buffer: &str) -> Vec<Boundary<'_>> {
    let mut boundaries = Vec::new();
    let mut offset = 0;

    for line in buffer.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        if let Some(path) = parse_marker_line(line) {
            boundaries.push(Boundary {
                path,
                line_start,
                body_start: offset,
                complete: line.ends_with('\n') || line.contains("-->"),
            });
        }
    }

    boundaries
}

/// Parse one line as a boundary marker, returning the raw path.
///
/// `<!-- FILE-BOUNDARY: path -->` is accepted as well.
fn parse_marker_line(line: &str) -> Option<&str> {
    let mut text = line.trim();
    if let Some(inner) = text.strip_prefix("<!--") {
        text = inner.split("-->").next().unwrap_or(inner).trim();
        // A comment close that has only partly arrived.
        text = text.trim_end_matches('-').trim_end();
    }
    text.strip_prefix(BOUNDARY_MARKER).map(str::trim)
}

fn extract_multi(buffer: &str, boundaries: &[Boundary<'_>]) -> Option<FileSet> {
    let mut files = FileSet::new();

    for (idx, boundary) in boundaries.iter().enumerate() {
        let body_end = boundaries
            .get(idx + 1)
            .map_or(buffer.len(), |next| next.line_start);
        if !boundary.complete {
            continue;
        }
        let body = &buffer[boundary.body_start..body_end];

        let Some(path) = normalize_path(boundary.path) else {
            tracing::debug!(path = boundary.path, "skipping boundary with malformed path");
            continue;
        };

        let content_type = classify(&path);
        files.insert_normalized(path, FileArtifact::new(content_type, strip_body_fence(body)));
    }

    if files.is_empty() {
        None
    } else {
        tracing::debug!(files = files.len(), "extracted boundary artifacts");
        Some(files)
    }
}

/// Strip one leading fence line and one trailing fence from a file body.
fn strip_body_fence(body: &str) -> &str {
    let mut text = body.trim();
    let opened = text.starts_with(FENCE);
    if opened {
        // The opening fence line may carry a language tag.
        text = text.find('\n').map_or("", |newline| &text[newline + 1..]);
    }

    let text = text.trim_end();
    match text.strip_suffix(FENCE) {
        Some(inner) => inner.trim(),
        None if opened => trim_partial_fence(text).trim(),
        None => text.trim(),
    }
}

/// Location of the first markup fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkupFence<'a> {
    /// The fence has a closing delimiter; holds the body between them
    Closed(&'a str),
    /// The closing delimiter has not arrived; holds everything after the opener
    Open(&'a str),
}

fn extract_single(buffer: &str) -> Option<FileSet> {
    let content = match find_markup_fence(buffer)? {
        MarkupFence::Closed(body) => body.trim(),
        MarkupFence::Open(body) => {
            let body = trim_partial_fence(body).trim();
            if body.is_empty() {
                return None;
            }
            body
        }
    };

    let mut files = FileSet::new();
    files.insert_normalized(
        ENTRY_POINT.to_string(),
        FileArtifact::new(ContentType::Markup, content),
    );
    Some(files)
}

fn find_markup_fence(buffer: &str) -> Option<MarkupFence<'_>> {
    for (idx, _) in buffer.match_indices(FENCE) {
        let after = &buffer[idx + FENCE.len()..];
        if !is_markup_tag(after) {
            continue;
        }

        let body = &after[MARKUP_TAG.len()..];
        return Some(match body.find(FENCE) {
            Some(end) => MarkupFence::Closed(&body[..end]),
            None => MarkupFence::Open(body),
        });
    }
    None
}

/// Whether `text` starts with the markup tag followed by whitespace or the
/// end of the buffer.
fn is_markup_tag(text: &str) -> bool {
    let Some(tag) = text.get(..MARKUP_TAG.len()) else {
        return false;
    };
    tag.eq_ignore_ascii_case(MARKUP_TAG)
        && text[MARKUP_TAG.len()..]
            .chars()
            .next()
            .map_or(true, char::is_whitespace)
}

/// Drop one or two trailing back-ticks that may be the start of a closing
/// fence still in flight.
fn trim_partial_fence(text: &str) -> &str {
    let trimmed = text.trim_end_matches('`');
    if text.len() - trimmed.len() < FENCE.len() {
        trimmed
    } else {
        text
    }
}
