// src/pipeline.rs
//! The conversion pipeline — six stages, strictly sequential.
//!
//! Expansion → schema resolution → frontmatter synthesis → path
//! normalization → link rewriting → view generation. Each stage commits
//! its file-system side effects before the next begins. Frontmatter must
//! run *before* renaming (database association is by original embedded
//! ID) and views must run *after* it (they embed final folder paths);
//! this ordering is a correctness invariant, not a preference.
//!
//! All work happens in a staging directory beside the output directory;
//! the tree is moved into place only when every stage has finished, so an
//! aborted run never leaves a half-converted vault at the output path.

use crate::archive;
use crate::config::PipelineConfig;
use crate::database::{self, DatabaseSchema};
use crate::error::AppError;
use crate::frontmatter;
use crate::links;
use crate::normalize;
use crate::vault::Workspace;
use crate::views;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Everything a completed run did, for the final summary.
#[derive(Debug, Default)]
pub struct ConversionReport {
    pub nested_archives: usize,
    pub wrapper_flattened: bool,
    pub artifacts_removed: usize,
    pub folders_collapsed: usize,
    pub files_renamed: usize,
    pub folders_renamed: usize,
    pub name_collisions: usize,
    pub csv_deduplicated: usize,
    pub frontmatter_written: usize,
    pub links_rewritten: usize,
    pub views_emitted: usize,
    pub markdown_files: usize,
    pub csv_files: usize,
    pub view_files: usize,
    pub other_files: usize,
    pub folders: usize,
}

/// Runs the whole conversion: expand the archive into staging, transform
/// the tree, commit it to the output directory.
pub fn run_conversion(config: &PipelineConfig) -> Result<ConversionReport, AppError> {
    ensure_output_dir_is_free(&config.output_dir)?;

    let staging_parent = config
        .output_dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&staging_parent)?;
    let staging = tempfile::Builder::new()
        .prefix(".notion2obsidian-")
        .tempdir_in(&staging_parent)?;

    let mut report = ConversionReport::default();

    report.nested_archives = archive::expand_archive(&config.archive, staging.path())?;

    let mut ws = Workspace::open(staging.path().to_path_buf())?;

    log::info!("Resolving database schemas...");
    let schemas = database::resolve_databases(ws.root())?;
    for schema in &schemas {
        log::info!(
            "Resolved database '{}' ({} columns)",
            schema.display_name,
            schema.column_order.len()
        );
    }
    report.csv_deduplicated =
        database::deduplicate_csv_pairs(&mut ws, &schemas, config.keep_all_csv)?;

    let mut database_keys: Vec<(&DatabaseSchema, Vec<String>)> = Vec::new();
    if config.frontmatter {
        log::info!("Synthesizing frontmatter for {} database(s)...", schemas.len());
        for schema in &schemas {
            let outcome = frontmatter::synthesize_for_database(ws.root(), schema)?;
            report.frontmatter_written += outcome.files_rewritten;
            database_keys.push((schema, outcome.observed_keys));
        }
    }

    log::info!("Normalizing paths...");
    let stats = normalize::normalize_tree(&mut ws)?;
    report.wrapper_flattened = stats.wrapper_flattened;
    report.artifacts_removed = stats.artifacts_removed;
    report.folders_collapsed = stats.folders_collapsed;
    report.files_renamed = stats.files_renamed;
    report.folders_renamed = stats.folders_renamed;
    report.name_collisions = stats.name_collisions;

    let root = staging.path().to_path_buf();
    let map = ws.finalize();
    debug_assert!(map.is_injective(), "rename map must never merge two entries");
    log::info!("Rename map committed over {} entries", map.len());

    log::info!("Rewriting internal links...");
    report.links_rewritten = links::rewrite_links(&root, &map)?;

    if config.frontmatter {
        log::info!("Generating database views...");
        report.views_emitted = views::generate_views(&root, &map, &database_keys)?;
    }

    commit_staging(staging, &config.output_dir)?;
    tally_output(&config.output_dir, &mut report)?;

    Ok(report)
}

/// Refuses to run against an output directory holding unrelated content.
/// An absent or empty directory is fine; anything else would amount to a
/// silent overwrite.
fn ensure_output_dir_is_free(output: &Path) -> Result<(), AppError> {
    if !output.exists() {
        return Ok(());
    }
    if !output.is_dir() {
        return Err(AppError::OutputDirNotEmpty(output.to_path_buf()));
    }
    if fs::read_dir(output)?.next().is_some() {
        return Err(AppError::OutputDirNotEmpty(output.to_path_buf()));
    }
    Ok(())
}

/// Moves the finished staging tree into the output directory.
fn commit_staging(staging: TempDir, output: &Path) -> Result<(), AppError> {
    let staged = staging.keep();
    if output.exists() {
        // Validated empty up front; an empty directory blocks the rename.
        fs::remove_dir(output)?;
    }
    fs::rename(&staged, output).map_err(|source| AppError::PathIo {
        path: staged,
        source,
    })?;
    Ok(())
}

/// Counts what ended up in the vault, for the completion summary.
fn tally_output(output: &Path, report: &mut ConversionReport) -> Result<(), AppError> {
    for entry in WalkDir::new(output).min_depth(1) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            report.folders += 1;
            continue;
        }
        match entry.path().extension().and_then(|e| e.to_str()) {
            Some("md") => report.markdown_files += 1,
            Some("csv") => report.csv_files += 1,
            Some("base") => report.view_files += 1,
            _ => report.other_files += 1,
        }
    }
    Ok(())
}
