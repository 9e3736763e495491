//! Build configuration and store path resolution.
//!
//! # Responsibility
//! - Hold the backlinks annotation delimiter used by graph builds.
//! - Resolve the note store location from explicit input, env, or default.
//!
//! # Invariants
//! - `GraphConfig` is part of the build fingerprint; equal configs must
//!   produce equal graphs for an unchanged store.

use std::path::PathBuf;

/// Delimiter marking the auto-generated backlinks section of a note.
pub const DEFAULT_BACKLINKS_HEADER: &str = "\n## Backlinks";

/// Environment variable overriding the default store location.
pub const DB_PATH_ENV: &str = "NOTEGRAPH_DB_PATH";

/// Bear's database location relative to `$HOME` on macOS.
const BEAR_DB_RELATIVE_PATH: &str =
    "Library/Group Containers/9K33E3U3T4.net.shinyfrog.bear/Application Data/database.sqlite";

/// Options for one graph build.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphConfig {
    /// Text before the first occurrence of this header is scanned for
    /// references. Empty means notes carry no annotation section.
    pub backlinks_header: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            backlinks_header: DEFAULT_BACKLINKS_HEADER.to_string(),
        }
    }
}

impl GraphConfig {
    pub fn with_backlinks_header(backlinks_header: impl Into<String>) -> Self {
        Self {
            backlinks_header: backlinks_header.into(),
        }
    }

    /// Rejects headers that would split notes at arbitrary whitespace.
    pub fn validate(&self) -> Result<(), String> {
        if !self.backlinks_header.is_empty() && self.backlinks_header.trim().is_empty() {
            return Err("backlinks header must not be whitespace only".to_string());
        }
        Ok(())
    }
}

/// Resolves the note store path.
///
/// Precedence: `explicit`, then `NOTEGRAPH_DB_PATH`, then Bear's default
/// location under `$HOME`. Returns `None` when nothing can be resolved.
pub fn resolve_db_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit.filter(|path| !path.as_os_str().is_empty()) {
        return Some(path);
    }

    if let Ok(raw) = std::env::var(DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(BEAR_DB_RELATIVE_PATH))
}
