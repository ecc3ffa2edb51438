//! # vibe_core
//!
//! Pure building blocks of the vibeFactory generation pipeline.
//!
//! Nothing in this crate performs I/O against a model or suspends; every
//! function is synchronous and safe to call from any thread.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`classify`] | File extension to content type |
//! | [`fileset`] | The virtual multi-file project |
//! | [`extract`] | Generated text to [`FileSet`], safe on partial streams |
//! | [`structured`] | JSON objects embedded in agent replies |
//! | [`roles`] | Agent roles, pipeline stages and progress bands |
//! | [`progress`] | Per-role progress projected from overall progress |
//! | [`defaults`] | Built-in entry point, stylesheet and readme |

pub mod classify;
pub mod defaults;
pub mod error;
pub mod extract;
pub mod fileset;
pub mod progress;
pub mod roles;
pub mod structured;

pub use classify::{classify, ContentType};
pub use defaults::{ensure_defaults, INDEX_HTML_PATH, README_PATH, STYLESHEET_PATH};
pub use error::{CoreError, CoreResult};
pub use extract::{extract, has_boundaries, render, BOUNDARY_MARKER, ENTRY_POINT};
pub use fileset::{normalize_path, FileArtifact, FileSet};
pub use progress::{project, ProgressSnapshot, RoleProgress, RoleStatus};
pub use roles::{AgentRole, Band, Stage};
pub use structured::{extract_structured, extract_structured_as};
