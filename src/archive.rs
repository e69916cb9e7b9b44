// src/archive.rs
//! Archive expansion — turns a Notion export zip into a flat working tree.
//!
//! Notion wraps large exports in a zip-of-zips (`Part-1.zip`, `Part-2.zip`
//! inside the outer archive). Expansion is transitive: after the outer
//! archive is unpacked, any archive found in the tree is unpacked in place
//! and deleted, round by round, until no archive entries remain.
//!
//! Archive failures are the one fatal error class of the pipeline: a
//! corrupt inner archive aborts the run with the offending path rather
//! than leaving a partially expanded tree behind.

use crate::constants::MAX_ARCHIVE_NESTING;
use crate::error::AppError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::ZipArchive;

/// Expands `archive` into `dest`, including any nested archives.
///
/// Returns the number of nested archives that were expanded (zero for a
/// plain single-zip export).
pub fn expand_archive(archive: &Path, dest: &Path) -> Result<usize, AppError> {
    fs::create_dir_all(dest)?;

    log::info!("Extracting '{}'...", archive.display());
    extract_into(archive, dest)?;

    let mut nested_total = 0;
    for round in 0..MAX_ARCHIVE_NESTING {
        let nested = find_archives(dest)?;
        if nested.is_empty() {
            break;
        }

        log::info!(
            "Found {} inner archive(s), extracting (round {})...",
            nested.len(),
            round + 1
        );
        for inner in nested {
            let parent = inner
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| dest.to_path_buf());
            extract_into(&inner, &parent)?;
            fs::remove_file(&inner).map_err(|source| AppError::PathIo {
                path: inner.clone(),
                source,
            })?;
            nested_total += 1;
        }
    }

    Ok(nested_total)
}

/// Extracts every entry of one zip archive into `dest`.
///
/// Entries whose names escape the destination root (absolute paths,
/// `..` traversal) are rejected outright.
fn extract_into(archive_path: &Path, dest: &Path) -> Result<(), AppError> {
    let file = fs::File::open(archive_path).map_err(|source| AppError::PathIo {
        path: archive_path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(file).map_err(|source| AppError::Archive {
        path: archive_path.to_path_buf(),
        source,
    })?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|source| AppError::Archive {
            path: archive_path.to_path_buf(),
            source,
        })?;

        let rel = entry
            .enclosed_name()
            .ok_or_else(|| AppError::UnsafeArchivePath(entry.name().to_string()))?;
        let target = dest.join(rel);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&target).map_err(|source| AppError::PathIo {
            path: target.clone(),
            source,
        })?;
        io::copy(&mut entry, &mut out)?;
    }

    Ok(())
}

/// Collects every `.zip` file currently in the tree, sorted by path so
/// `Part-1.zip` expands before `Part-2.zip`.
fn find_archives(root: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut archives = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
        {
            archives.push(entry.path().to_path_buf());
        }
    }
    Ok(archives)
}
