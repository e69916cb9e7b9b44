// src/vault/workspace.rs
//! The mutable working tree and its rename bookkeeping.
//!
//! Every file-system mutation the pipeline performs goes through
//! `Workspace`, which applies the change on disk and mirrors it into the
//! `RenameLedger` in the same call. Stages never call `fs::rename`
//! directly; that is the invariant that keeps the eventual `RenameMap`
//! truthful.

use crate::error::AppError;
use crate::vault::ledger::{RenameLedger, RenameMap};
use crate::vault::paths::unique_sibling;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A working tree rooted at the staging directory, with every entry
/// tracked relative to the root.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    ledger: RenameLedger,
}

impl Workspace {
    /// Opens a freshly expanded tree and seeds the ledger with every
    /// entry, in sorted traversal order.
    pub fn open(root: PathBuf) -> Result<Self, AppError> {
        let mut ledger = RenameLedger::new();

        for entry in WalkDir::new(&root).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            let rel = entry
                .path()
                .strip_prefix(&root)
                .map_err(|e| AppError::Internal {
                    message: format!(
                        "walked entry {} outside workspace root",
                        entry.path().display()
                    ),
                    source: Some(Box::new(e)),
                })?
                .to_path_buf();
            ledger.track(rel);
        }

        log::debug!(
            "Workspace opened at {} with {} entries",
            root.display(),
            ledger.len()
        );

        Ok(Self { root, ledger })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ledger(&self) -> &RenameLedger {
        &self.ledger
    }

    /// Absolute path of a root-relative entry.
    pub fn abs(&self, rel: &Path) -> PathBuf {
        self.root.join(rel)
    }

    /// Renames an entry, carrying any tracked descendants along.
    pub fn rename(&mut self, from: &Path, to: &Path) -> Result<(), AppError> {
        fs::rename(self.abs(from), self.abs(to)).map_err(|source| AppError::PathIo {
            path: self.abs(from),
            source,
        })?;
        self.ledger.record_rename(from, to);
        Ok(())
    }

    /// Removes a file and drops it from the ledger.
    pub fn remove_file(&mut self, rel: &Path) -> Result<(), AppError> {
        fs::remove_file(self.abs(rel)).map_err(|source| AppError::PathIo {
            path: self.abs(rel),
            source,
        })?;
        self.ledger.record_removal(rel);
        Ok(())
    }

    /// Removes an empty folder and drops it from the ledger.
    pub fn remove_empty_dir(&mut self, rel: &Path) -> Result<(), AppError> {
        fs::remove_dir(self.abs(rel)).map_err(|source| AppError::PathIo {
            path: self.abs(rel),
            source,
        })?;
        self.ledger.record_removal(rel);
        Ok(())
    }

    /// Re-parents every child of `dir` to `dir`'s parent, then removes the
    /// emptied folder. Children colliding with existing siblings receive a
    /// numeric suffix. Returns the number of promoted children.
    pub fn promote_children(&mut self, dir: &Path) -> Result<usize, AppError> {
        let parent = dir.parent().unwrap_or_else(|| Path::new("")).to_path_buf();

        let mut names: Vec<PathBuf> = fs::read_dir(self.abs(dir))
            .map_err(|source| AppError::PathIo {
                path: self.abs(dir),
                source,
            })?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|e| PathBuf::from(e.file_name()))
            .collect();
        names.sort();

        let mut moved = 0;
        for name in names {
            let desired = self.abs(&parent).join(&name);
            let target = unique_sibling(&desired);
            let target_name = match target.file_name() {
                Some(n) => PathBuf::from(n),
                None => name.clone(),
            };
            if target != desired {
                log::warn!(
                    "Collision while collapsing '{}': '{}' re-parented as '{}'",
                    dir.display(),
                    name.display(),
                    target_name.display(),
                );
            }
            let target_rel = parent.join(&target_name);
            self.rename(&dir.join(&name), &target_rel)?;
            moved += 1;
        }

        self.remove_empty_dir(dir)?;
        Ok(moved)
    }

    /// Commits the bookkeeping: consumes the workspace and freezes the
    /// ledger into the immutable rename map.
    pub fn finalize(self) -> RenameMap {
        self.ledger.finalize()
    }
}
