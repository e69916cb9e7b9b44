// src/vault/ledger.rs
//! The global rename mapping, built as a two-phase commit.
//!
//! Phase one: a `RenameLedger` is seeded with every entry of the freshly
//! expanded tree and updated live as stages mutate it. Phase two:
//! `finalize` freezes the ledger into a read-only `RenameMap` that the
//! link rewriter consumes. Nothing mutates paths after finalization.
//!
//! All paths are relative to the working-tree root. Insertion order is
//! the original traversal order, which is what the collision tie-break
//! policy ("later-processed entry gets the suffix") is defined against.

use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Live mapping from original path to current path for every surviving
/// entry of the working tree.
#[derive(Debug, Default)]
pub struct RenameLedger {
    entries: IndexMap<PathBuf, PathBuf>,
}

impl RenameLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entry at its as-extracted path. Current and original
    /// start out identical.
    pub fn track(&mut self, original: PathBuf) {
        self.entries.insert(original.clone(), original);
    }

    /// Records a physical rename of `from` to `to` (both current paths).
    ///
    /// Entries below a renamed folder are carried along: their current
    /// paths are prefix-rewritten.
    pub fn record_rename(&mut self, from: &Path, to: &Path) {
        for current in self.entries.values_mut() {
            if current.as_path() == from {
                *current = to.to_path_buf();
            } else if let Ok(tail) = current.strip_prefix(from) {
                *current = to.join(tail);
            }
        }
    }

    /// Records removal of an entry (current path). Anything tracked below
    /// it is dropped as well.
    pub fn record_removal(&mut self, target: &Path) {
        self.entries.retain(|_, current| !current.starts_with(target));
    }

    /// The current path of an entry, by original path.
    #[allow(dead_code)] // Used by tests and library consumers
    pub fn current_of(&self, original: &Path) -> Option<&Path> {
        self.entries.get(original).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freezes the ledger into the immutable rename map.
    pub fn finalize(self) -> RenameMap {
        RenameMap {
            entries: self.entries,
        }
    }
}

/// Immutable original-to-final path mapping over all surviving entries.
///
/// Total over survivors and injective: no two originals map to the same
/// final path (collisions were disambiguated before commit).
#[derive(Debug)]
pub struct RenameMap {
    entries: IndexMap<PathBuf, PathBuf>,
}

impl RenameMap {
    /// The final path of an entry, by original path. `None` means the
    /// entry did not survive (collapsed folder, deduplicated CSV) or was
    /// never part of the tree.
    pub fn final_path(&self, original: &Path) -> Option<&Path> {
        self.entries.get(original).map(PathBuf::as_path)
    }

    /// Iterates `(original, final)` pairs in original traversal order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.entries
            .iter()
            .map(|(original, fin)| (original.as_path(), fin.as_path()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether no two originals share a final path. Holds by construction;
    /// checked via `debug_assert!` before link rewriting.
    pub fn is_injective(&self) -> bool {
        let distinct: HashSet<&PathBuf> = self.entries.values().collect();
        distinct.len() == self.entries.len()
    }
}
