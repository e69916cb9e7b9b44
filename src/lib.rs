// src/lib.rs
//! notion2obsidian library — converts a Notion "Markdown & CSV" export
//! into a clean Obsidian vault.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling** — `AppError`
//! - **Configuration** — `CommandLineInput`, `PipelineConfig`
//! - **Pipeline** — `run_conversion`, `ConversionReport`
//! - **Naming** — `strip_embedded_id`, `clean_entry_name`, `EmbeddedId`
//! - **Rename bookkeeping** — `Workspace`, `RenameLedger`, `RenameMap`
//! - **Databases** — `DatabaseSchema`, `resolve_databases`
//! - **Frontmatter** — `scan_property_block`, `synthesize_for_database`

// Internal modules — must match what's in main.rs
mod archive;
mod config;
mod constants;
mod database;
mod error;
mod frontmatter;
mod links;
mod naming;
mod normalize;
mod pipeline;
mod vault;
mod views;

// --- Error Handling ---
pub use crate::error::AppError;

// --- Configuration ---
pub use crate::config::{CommandLineInput, PipelineConfig};

// --- Pipeline ---
pub use crate::pipeline::{run_conversion, ConversionReport};

// --- Archive Expansion ---
pub use crate::archive::expand_archive;

// --- Naming ---
pub use crate::naming::{
    clean_entry_name, is_export_wrapper, is_hex_only_name, strip_embedded_id, EmbeddedId,
};

// --- Rename Bookkeeping ---
pub use crate::vault::{RenameLedger, RenameMap, Workspace};

// --- Path Normalization ---
pub use crate::normalize::{normalize_tree, NormalizeStats};

// --- Databases ---
pub use crate::database::{deduplicate_csv_pairs, resolve_databases, DatabaseSchema};

// --- Frontmatter ---
pub use crate::frontmatter::{
    parser::{scan_property_block, PropertyBlock},
    synthesize_for_database, DatabaseFrontmatter,
};
pub use crate::frontmatter::values::{normalize_key, normalize_value};

// --- Links & Views ---
pub use crate::links::rewrite_links;
pub use crate::views::generate_views;
