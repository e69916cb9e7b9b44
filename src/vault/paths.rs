// src/vault/paths.rs
//! Pure functions for path calculations and collision-safe naming.
//!
//! This module handles all path-related computation without performing
//! any mutation; the single existence check in `unique_sibling` is the
//! read the disambiguation policy is defined over.

use crate::constants::DISAMBIGUATION_LIMIT;
use std::path::{Path, PathBuf};

/// Returns `target` if it is free, otherwise the first ` (N)`-suffixed
/// sibling that is.
///
/// This is the collision tie-break for post-strip name clashes: the entry
/// processed later receives the numeric suffix, and data is never
/// silently overwritten.
pub fn unique_sibling(target: &Path) -> PathBuf {
    if !target.exists() {
        return target.to_path_buf();
    }

    let parent = target.parent().unwrap_or_else(|| Path::new(""));
    let stem = target
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed");
    let ext = target
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    for i in 1..DISAMBIGUATION_LIMIT {
        let candidate = parent.join(format!("{} ({}){}", stem, i, ext));
        if !candidate.exists() {
            return candidate;
        }
    }

    // A thousand same-named siblings means the export itself is degenerate;
    // reuse the limit as the final suffix rather than spinning forever.
    parent.join(format!("{} ({}){}", stem, DISAMBIGUATION_LIMIT, ext))
}

/// Normalizes a path by resolving `.` and `..` components lexically.
///
/// Link targets frequently contain `../`; resolving them against the
/// containing file's directory must not touch the file system, because
/// the referenced entry may already have been renamed away.
pub fn normalize_components(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            std::path::Component::ParentDir => {
                components.pop();
            }
            std::path::Component::CurDir => {
                // Skip
            }
            c => {
                components.push(c);
            }
        }
    }

    components.into_iter().collect()
}

/// Renders a path with forward slashes for Markdown and view-definition
/// compatibility.
pub fn to_slash_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
