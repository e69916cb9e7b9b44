// src/views.rs
//! View generation — one Obsidian base file per resolved database.
//!
//! A base file sits beside the database's CSV, filters on the database's
//! *final* folder path, and lists the frontmatter keys observed across
//! the database's entries as table columns. This stage therefore runs
//! last, after renaming and link rewriting have committed.

use crate::database::DatabaseSchema;
use crate::error::AppError;
use crate::vault::paths::to_slash_string;
use crate::vault::RenameMap;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// The serialized shape of a base file.
#[derive(Debug, Serialize)]
struct ViewDefinition {
    filters: FilterSet,
    views: Vec<TableView>,
}

#[derive(Debug, Serialize)]
struct FilterSet {
    and: Vec<String>,
}

#[derive(Debug, Serialize)]
struct TableView {
    #[serde(rename = "type")]
    kind: String,
    name: String,
    order: Vec<String>,
}

/// Emits one view-definition file per database. Returns how many were
/// written.
pub fn generate_views(
    root: &Path,
    map: &RenameMap,
    databases: &[(&DatabaseSchema, Vec<String>)],
) -> Result<usize, AppError> {
    let mut created = 0;

    for (schema, observed_keys) in databases {
        let Some(final_folder) = map.final_path(&schema.folder) else {
            log::warn!(
                "Database folder '{}' did not survive normalization; skipping its view",
                schema.folder.display()
            );
            continue;
        };

        let folder_str = to_slash_string(final_folder);
        let definition = ViewDefinition {
            filters: FilterSet {
                and: vec![
                    format!("file.inFolder(\"{}\")", folder_str),
                    "file.ext == \"md\"".to_string(),
                ],
            },
            views: vec![TableView {
                kind: "table".to_string(),
                name: schema.display_name.clone(),
                order: std::iter::once("file.name".to_string())
                    .chain(observed_keys.iter().cloned())
                    .collect(),
            }],
        };

        let yaml = serde_yaml::to_string(&definition).map_err(|source| AppError::ViewSerialize {
            name: schema.display_name.clone(),
            source,
        })?;

        let parent = final_folder.parent().unwrap_or_else(|| Path::new(""));
        let file_name = format!("{}.base", schema.display_name);
        let base_path = root.join(parent).join(file_name);
        fs::write(&base_path, yaml).map_err(|source| AppError::PathIo {
            path: base_path.clone(),
            source,
        })?;

        log::debug!("View definition written to '{}'", base_path.display());
        created += 1;
    }

    Ok(created)
}
