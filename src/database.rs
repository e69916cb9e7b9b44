// src/database.rs
//! Database schema resolution — which CSVs are Notion databases, and
//! which content folder does each one describe.
//!
//! Notion exports a database twice: `Tasks <id>.csv` (the filtered view)
//! and `Tasks <id>_all.csv` (every row), next to a `Tasks <id>/` folder
//! holding one Markdown file per row. Resolution runs while names still
//! carry their embedded IDs, so the CSV-to-folder association is
//! unambiguous. A CSV that does not open with a `Name` column is plain
//! content and is left untouched.

use crate::constants::{COMPLETE_CSV_SUFFIX, DATABASE_NAME_COLUMN};
use crate::error::AppError;
use crate::naming::{clean_entry_name, EmbeddedId};
use crate::vault::Workspace;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One resolved database: its content folder, the CSV exports that
/// describe it, and the column order from the complete CSV's header.
#[derive(Debug, Clone)]
pub struct DatabaseSchema {
    /// Content folder holding one Markdown file per row, as extracted.
    pub folder: PathBuf,
    /// Folder name with the embedded ID stripped.
    pub display_name: String,
    /// Header columns of the complete CSV; the first is always `Name`.
    pub column_order: Vec<String>,
    /// The CSV carrying every row (`<base>_all.csv` when a pair exists).
    pub complete_csv: PathBuf,
    /// The redundant filtered-view CSV, when the export contains one.
    pub filtered_csv: Option<PathBuf>,
}

#[derive(Debug, Default)]
struct CsvPair {
    complete: Option<PathBuf>,
    filtered: Option<PathBuf>,
}

/// Scans the freshly expanded tree and resolves every database: CSV
/// pairing by base name, table detection by header, folder association
/// by embedded ID.
pub fn resolve_databases(root: &Path) -> Result<Vec<DatabaseSchema>, AppError> {
    let mut csv_files: Vec<PathBuf> = Vec::new();
    let mut folders_by_parent: HashMap<PathBuf, Vec<String>> = HashMap::new();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let rel = match entry.path().strip_prefix(root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => continue,
        };
        if entry.file_type().is_dir() {
            let parent = rel.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
            let name = entry.file_name().to_string_lossy().into_owned();
            folders_by_parent.entry(parent).or_default().push(name);
        } else if rel.extension().is_some_and(|e| e.eq_ignore_ascii_case("csv")) {
            csv_files.push(rel);
        }
    }

    // Pair `<base>.csv` with `<base>_all.csv` by shared base stem.
    let mut pairs: IndexMap<(PathBuf, String), CsvPair> = IndexMap::new();
    for rel in csv_files {
        let parent = rel.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
        let stem = match rel.file_stem() {
            Some(stem) => stem.to_string_lossy().into_owned(),
            None => continue,
        };
        match stem.strip_suffix(COMPLETE_CSV_SUFFIX) {
            Some(base) => {
                pairs
                    .entry((parent, base.to_string()))
                    .or_default()
                    .complete = Some(rel);
            }
            None => {
                pairs.entry((parent, stem)).or_default().filtered = Some(rel);
            }
        }
    }

    let mut schemas = Vec::new();
    for ((parent, base_stem), pair) in pairs {
        // The `_all` export carries every row; a lone plain CSV is itself
        // the complete export.
        let (complete, filtered) = match (pair.complete, pair.filtered) {
            (Some(complete), filtered) => (complete, filtered),
            (None, Some(only)) => (only, None),
            (None, None) => continue,
        };

        let Some(column_order) = read_database_columns(&root.join(&complete)) else {
            log::debug!(
                "'{}' has no database header; treating as plain content",
                complete.display()
            );
            continue;
        };

        let Some(folder_name) =
            find_database_folder(folders_by_parent.get(&parent), &base_stem)
        else {
            log::debug!(
                "No content folder found for database CSV '{}'",
                complete.display()
            );
            continue;
        };

        schemas.push(DatabaseSchema {
            folder: parent.join(&folder_name),
            display_name: clean_entry_name(&folder_name),
            column_order,
            complete_csv: complete,
            filtered_csv: filtered,
        });
    }

    Ok(schemas)
}

/// Deletes the redundant filtered CSV of each resolved database and
/// renames the complete CSV to drop its `_all` suffix. Under retention
/// mode nothing is deleted or renamed. Returns the number of filtered
/// CSVs removed.
pub fn deduplicate_csv_pairs(
    ws: &mut Workspace,
    schemas: &[DatabaseSchema],
    retain: bool,
) -> Result<usize, AppError> {
    if retain {
        log::info!("Keeping both filtered and complete CSV exports");
        return Ok(0);
    }

    let mut removed = 0;
    for schema in schemas {
        if let Some(filtered) = &schema.filtered_csv {
            ws.remove_file(filtered)?;
            removed += 1;
        }

        let stem = schema
            .complete_csv
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(base) = stem.strip_suffix(COMPLETE_CSV_SUFFIX) {
            let target = schema.complete_csv.with_file_name(format!("{}.csv", base));
            ws.rename(&schema.complete_csv, &target)?;
        }
    }

    Ok(removed)
}

/// Reads the header row of a CSV and returns its columns when they mark
/// a Notion database table: first column `Name`, case-insensitive, with
/// a leading byte-order mark tolerated. Unreadable or non-conforming
/// files yield `None`; a schema anomaly is never a fatal error.
fn read_database_columns(path: &Path) -> Option<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .ok()?;

    let header = reader.records().next()?.ok()?;
    let mut columns: Vec<String> = header
        .iter()
        .map(|field| field.trim())
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect();

    let first = columns.first_mut()?;
    *first = first.trim_start_matches('\u{feff}').trim().to_string();
    if !first.eq_ignore_ascii_case(DATABASE_NAME_COLUMN) {
        return None;
    }

    Some(columns)
}

/// Finds the content folder matching a CSV's base stem among sibling
/// folders, preferring embedded-ID equality and falling back to cleaned
/// name equality when either side carries no ID.
fn find_database_folder(siblings: Option<&Vec<String>>, base_stem: &str) -> Option<String> {
    let siblings = siblings?;
    if let Some(csv_id) = EmbeddedId::extract(base_stem) {
        for name in siblings {
            if EmbeddedId::extract(name).as_ref() == Some(&csv_id) {
                return Some(name.clone());
            }
        }
    }

    let cleaned = clean_entry_name(base_stem);
    siblings
        .iter()
        .find(|name| clean_entry_name(name) == cleaned)
        .cloned()
}
