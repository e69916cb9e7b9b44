// src/frontmatter/mod.rs
//! Frontmatter synthesis — property blocks become YAML metadata headers.
//!
//! For every Markdown file directly inside a resolved database folder,
//! the leading property block is parsed, keys and values are normalized,
//! and the file is rewritten as a `---`-delimited YAML header followed by
//! the unchanged body. This stage runs on *original* paths, before any
//! renaming, because the database association was computed against
//! original embedded IDs.

pub mod parser;
pub mod values;

use crate::database::DatabaseSchema;
use crate::error::AppError;
use indexmap::IndexMap;
use parser::scan_property_block;
use std::fs;
use std::path::Path;
use values::{normalize_key, normalize_value};

/// What frontmatter synthesis produced for one database.
#[derive(Debug, Default)]
pub struct DatabaseFrontmatter {
    /// Markdown entries rewritten with a metadata header.
    pub files_rewritten: usize,
    /// Union of normalized frontmatter keys across the database's
    /// entries, in first-seen order. Feeds the view generator.
    pub observed_keys: Vec<String>,
}

/// Rewrites every Markdown entry of one database with a YAML frontmatter
/// header synthesized from its property block.
pub fn synthesize_for_database(
    root: &Path,
    schema: &DatabaseSchema,
) -> Result<DatabaseFrontmatter, AppError> {
    let folder = root.join(&schema.folder);
    let mut outcome = DatabaseFrontmatter::default();

    let mut entries: Vec<_> = fs::read_dir(&folder)
        .map_err(|source| AppError::PathIo {
            path: folder.clone(),
            source,
        })?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|e| e.path())
        .collect();
    entries.sort();

    for path in entries {
        if !path.is_file() || path.extension().is_none_or(|e| e != "md") {
            continue;
        }

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Skipping unreadable entry '{}': {}", path.display(), e);
                continue;
            }
        };

        if let Some(rewritten) = synthesize_document(&text, &path, &mut outcome.observed_keys)? {
            fs::write(&path, rewritten).map_err(|source| AppError::PathIo {
                path: path.clone(),
                source,
            })?;
            outcome.files_rewritten += 1;
        }
    }

    log::debug!(
        "Database '{}': {} entries rewritten, {} distinct keys",
        schema.display_name,
        outcome.files_rewritten,
        outcome.observed_keys.len()
    );

    Ok(outcome)
}

/// Builds the rewritten document for one entry, or `None` when the file
/// carries no usable property block and should stay untouched.
fn synthesize_document(
    text: &str,
    path: &Path,
    observed_keys: &mut Vec<String>,
) -> Result<Option<String>, AppError> {
    let block = scan_property_block(text);
    if !block.has_properties() {
        return Ok(None);
    }

    let mut fields: IndexMap<String, String> = IndexMap::new();
    if let Some(title) = &block.title {
        fields.insert("title".to_string(), title.clone());
    }

    for (raw_key, raw_value) in &block.properties {
        let key = normalize_key(raw_key);
        if key.is_empty() {
            log::debug!(
                "Dropping property '{}' in '{}': nothing left after stripping glyphs",
                raw_key,
                path.display()
            );
            continue;
        }
        if fields.contains_key(&key) {
            log::warn!(
                "Duplicate frontmatter key '{}' in '{}'; keeping the first occurrence",
                key,
                path.display()
            );
            continue;
        }

        fields.insert(key.clone(), normalize_value(raw_value));
        if key != "title" && !observed_keys.contains(&key) {
            observed_keys.push(key);
        }
    }

    // Every property normalized away: nothing worth a header.
    let title_only = usize::from(block.title.is_some());
    if fields.len() <= title_only {
        return Ok(None);
    }

    let yaml = serde_yaml::to_string(&fields).map_err(|source| AppError::Frontmatter {
        path: path.to_path_buf(),
        source,
    })?;

    let body = block.body.trim_start_matches('\n');
    Ok(Some(format!("---\n{}---\n\n{}", yaml, body)))
}
