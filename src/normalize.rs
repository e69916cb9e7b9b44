// src/normalize.rs
//! Path normalization — the stage that commits the rename map.
//!
//! Order within the stage matters: the export wrapper is flattened first,
//! export artifacts are removed, hex-only container folders are collapsed
//! bottom-up, and only then are embedded IDs stripped from every
//! remaining name. Collisions after stripping are disambiguated with a
//! numeric suffix; nothing is ever silently overwritten.

use crate::constants::EXPORT_INDEX_FILE;
use crate::error::AppError;
use crate::naming::{clean_entry_name, is_export_wrapper, is_hex_only_name};
use crate::vault::paths::unique_sibling;
use crate::vault::Workspace;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Counters for what normalization did to the tree.
#[derive(Debug, Default)]
pub struct NormalizeStats {
    pub wrapper_flattened: bool,
    pub artifacts_removed: usize,
    pub folders_collapsed: usize,
    pub files_renamed: usize,
    pub folders_renamed: usize,
    pub name_collisions: usize,
}

/// Runs the full normalization pass and leaves the workspace ready for
/// `finalize()`.
pub fn normalize_tree(ws: &mut Workspace) -> Result<NormalizeStats, AppError> {
    let mut stats = NormalizeStats::default();

    flatten_wrapper(ws, &mut stats)?;
    remove_export_artifacts(ws, &mut stats)?;
    stats.folders_collapsed = collapse_hex_only_folders(ws)?;
    strip_embedded_ids(ws, &mut stats)?;

    Ok(stats)
}

/// Promotes the children of the `Export-<uuid>` wrapper when it is the
/// tree's sole top-level entry, then flattens a remaining solitary
/// top-level folder the same way (large exports occasionally nest the
/// workspace folder inside the wrapper).
fn flatten_wrapper(ws: &mut Workspace, stats: &mut NormalizeStats) -> Result<(), AppError> {
    if let Some(wrapper) = sole_top_level_folder(ws.root())? {
        if is_export_wrapper(&wrapper) {
            log::info!("Flattening export wrapper '{}'", wrapper);
            ws.promote_children(Path::new(&wrapper))?;
            stats.wrapper_flattened = true;
        }
    }

    if let Some(folder) = sole_top_level_folder(ws.root())? {
        log::info!("Flattening solitary top-level folder '{}'", folder);
        ws.promote_children(Path::new(&folder))?;
        stats.wrapper_flattened = true;
    }

    Ok(())
}

/// The name of the single top-level folder, when the tree has exactly
/// one top-level entry and it is a folder.
fn sole_top_level_folder(root: &Path) -> Result<Option<String>, AppError> {
    let mut entries = std::fs::read_dir(root)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    match entries.as_slice() {
        [only] if only.path().is_dir() => Ok(Some(only.file_name().to_string_lossy().into_owned())),
        _ => Ok(None),
    }
}

/// Removes known non-content export artifacts (the generated HTML index).
fn remove_export_artifacts(ws: &mut Workspace, stats: &mut NormalizeStats) -> Result<(), AppError> {
    let index = PathBuf::from(EXPORT_INDEX_FILE);
    if ws.abs(&index).is_file() {
        log::info!("Removing export artifact '{}'", index.display());
        ws.remove_file(&index)?;
        stats.artifacts_removed += 1;
    }
    Ok(())
}

/// Collapses folders whose name is purely an embedded ID, bottom-up,
/// until none remain. A collapsed folder's children are re-parented one
/// level higher; a promoted child may itself become collapsible, hence
/// the outer loop.
fn collapse_hex_only_folders(ws: &mut Workspace) -> Result<usize, AppError> {
    let mut collapsed = 0;

    loop {
        let mut targets: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(ws.root()).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_dir()
                && is_hex_only_name(&entry.file_name().to_string_lossy())
            {
                if let Ok(rel) = entry.path().strip_prefix(ws.root()) {
                    targets.push(rel.to_path_buf());
                }
            }
        }
        if targets.is_empty() {
            break;
        }

        // Deepest first, so nested containers collapse before their parents.
        targets.sort_by_key(|p| std::cmp::Reverse(p.components().count()));
        for dir in targets {
            if !ws.abs(&dir).is_dir() {
                continue;
            }
            log::debug!("Collapsing hex-only folder '{}'", dir.display());
            ws.promote_children(&dir)?;
            collapsed += 1;
        }
    }

    Ok(collapsed)
}

/// Strips embedded IDs from every remaining entry name, deepest entries
/// first so renames never invalidate the paths still to be visited.
fn strip_embedded_ids(ws: &mut Workspace, stats: &mut NormalizeStats) -> Result<(), AppError> {
    let mut entries: Vec<(PathBuf, bool)> = Vec::new();
    for entry in WalkDir::new(ws.root())
        .min_depth(1)
        .sort_by_file_name()
        .contents_first(true)
    {
        let entry = entry?;
        if let Ok(rel) = entry.path().strip_prefix(ws.root()) {
            entries.push((rel.to_path_buf(), entry.file_type().is_dir()));
        }
    }

    for (rel, is_dir) in entries {
        let name = match rel.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => continue,
        };
        let cleaned = clean_entry_name(&name);
        if cleaned == name {
            continue;
        }

        let parent = rel.parent().unwrap_or_else(|| Path::new(""));
        let desired = ws.abs(parent).join(&cleaned);
        let target = unique_sibling(&desired);
        if target != desired {
            stats.name_collisions += 1;
            log::warn!(
                "Name collision: '{}' becomes '{}'",
                rel.display(),
                target.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
            );
        }

        let target_name = match target.file_name() {
            Some(name) => PathBuf::from(name),
            None => continue,
        };
        ws.rename(&rel, &parent.join(target_name))?;

        if is_dir {
            stats.folders_renamed += 1;
        } else {
            stats.files_renamed += 1;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    const WRAPPER: &str = "Export-1234abcd-12ab-34cd-56ef-1234567890ab";
    const HEX_DIR: &str = "8f2fb47d8d79400e96243c1c411716dc";

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn flattens_the_export_wrapper() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join(WRAPPER).join("Home.md"));
        touch(&tmp.path().join(WRAPPER).join("Tasks/Fix.md"));

        let mut ws = Workspace::open(tmp.path().to_path_buf()).unwrap();
        let stats = normalize_tree(&mut ws).unwrap();

        assert!(stats.wrapper_flattened);
        assert!(tmp.path().join("Home.md").is_file());
        assert!(tmp.path().join("Tasks/Fix.md").is_file());
        assert!(!tmp.path().join(WRAPPER).exists());
    }

    #[test]
    fn keeps_multiple_top_level_entries_in_place() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("One/a.md"));
        touch(&tmp.path().join("Two/b.md"));

        let mut ws = Workspace::open(tmp.path().to_path_buf()).unwrap();
        let stats = normalize_tree(&mut ws).unwrap();

        assert!(!stats.wrapper_flattened);
        assert!(tmp.path().join("One/a.md").is_file());
        assert!(tmp.path().join("Two/b.md").is_file());
    }

    #[test]
    fn removes_the_export_index() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("index.html"));
        touch(&tmp.path().join("Home.md"));

        let mut ws = Workspace::open(tmp.path().to_path_buf()).unwrap();
        let stats = normalize_tree(&mut ws).unwrap();

        assert_eq!(stats.artifacts_removed, 1);
        assert!(!tmp.path().join("index.html").exists());
    }

    #[test]
    fn collapses_hex_only_folders_recursively() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp
            .path()
            .join(HEX_DIR)
            .join("a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6");
        touch(&nested.join("Fix Bugs a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6.md"));
        touch(&tmp.path().join("Home.md"));

        let mut ws = Workspace::open(tmp.path().to_path_buf()).unwrap();
        let stats = normalize_tree(&mut ws).unwrap();

        assert_eq!(stats.folders_collapsed, 2);
        assert!(!tmp.path().join(HEX_DIR).exists());
        assert!(tmp.path().join("Fix Bugs.md").is_file());
    }

    #[test]
    fn strips_ids_from_files_and_folders() {
        let tmp = tempfile::tempdir().unwrap();
        touch(
            &tmp.path()
                .join("Tasks 8f2fb47d8d79400e96243c1c411716dc")
                .join("Fix Bugs a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6.md"),
        );
        touch(&tmp.path().join("Home e82f1f46f47e4859aef48d9da4875832.md"));
        touch(&tmp.path().join("plain.md"));

        let mut ws = Workspace::open(tmp.path().to_path_buf()).unwrap();
        let stats = normalize_tree(&mut ws).unwrap();

        assert_eq!(stats.files_renamed, 2);
        assert_eq!(stats.folders_renamed, 1);
        assert!(tmp.path().join("Tasks/Fix Bugs.md").is_file());
        assert!(tmp.path().join("Home.md").is_file());
        assert!(tmp.path().join("plain.md").is_file());

        let map = ws.finalize();
        assert_eq!(
            map.final_path(Path::new(
                "Tasks 8f2fb47d8d79400e96243c1c411716dc/Fix Bugs a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6.md"
            )),
            Some(Path::new("Tasks/Fix Bugs.md"))
        );
    }

    #[test]
    fn post_strip_collisions_get_numeric_suffixes() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("Home e82f1f46f47e4859aef48d9da4875832.md"));
        touch(&tmp.path().join("Home a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6.md"));

        let mut ws = Workspace::open(tmp.path().to_path_buf()).unwrap();
        let stats = normalize_tree(&mut ws).unwrap();

        assert_eq!(stats.name_collisions, 1);
        assert!(tmp.path().join("Home.md").is_file());
        assert!(tmp.path().join("Home (1).md").is_file());

        let map = ws.finalize();
        assert!(map.is_injective());
    }
}
