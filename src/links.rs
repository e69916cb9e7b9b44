// src/links.rs
//! Link rewriting — internal Markdown references follow the rename map.
//!
//! Runs strictly after the rename map is committed: each link target is
//! percent-decoded, resolved against its file's *original* directory,
//! looked up in the map, and on a hit replaced with the path relative to
//! the file's *final* directory, re-encoded per segment. External URLs,
//! anchors and unresolved targets pass through untouched. Rewriting is a
//! fixed point: a second pass over an already-rewritten tree changes
//! nothing.

use crate::error::AppError;
use crate::vault::paths::normalize_components;
use crate::vault::RenameMap;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

lazy_static! {
    // Inline links and images: "[text](target)" / "![alt](target)".
    static ref INLINE_LINK: Regex =
        Regex::new(r"(\[[^\]]*\]\()([^)]+)(\))").expect("inline-link pattern is valid");

    // Reference-style definitions: "[label]: target" at line start.
    static ref REFERENCE_DEF: Regex =
        Regex::new(r"(?m)^(\[[^\]]+\]:[ \t]+)(\S+)").expect("reference-def pattern is valid");
}

/// Schemes and prefixes that mark a target as external to the vault.
const EXTERNAL_PREFIXES: [&str; 5] = ["http://", "https://", "mailto:", "tel:", "#"];

/// Rewrites internal link targets in every surviving Markdown file.
/// Returns the number of targets rewritten.
pub fn rewrite_links(root: &Path, map: &RenameMap) -> Result<usize, AppError> {
    let mut rewritten = 0;

    for (original, fin) in map.iter() {
        if fin.extension().is_none_or(|e| e != "md") {
            continue;
        }

        let abs = root.join(fin);
        let text = match fs::read_to_string(&abs) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Skipping unreadable file '{}': {}", abs.display(), e);
                continue;
            }
        };

        let original_dir = original.parent().unwrap_or_else(|| Path::new(""));
        let final_dir = fin.parent().unwrap_or_else(|| Path::new(""));

        let mut changed = 0usize;
        let pass_one = INLINE_LINK.replace_all(&text, |caps: &Captures| {
            rewrite_capture(caps, original_dir, final_dir, map, &mut changed)
        });
        let pass_two = REFERENCE_DEF.replace_all(&pass_one, |caps: &Captures| {
            rewrite_capture(caps, original_dir, final_dir, map, &mut changed)
        });

        if changed > 0 && pass_two.as_ref() != text.as_str() {
            fs::write(&abs, pass_two.as_ref()).map_err(|source| AppError::PathIo {
                path: abs.clone(),
                source,
            })?;
            rewritten += changed;
        }
    }

    Ok(rewritten)
}

/// Re-assembles one matched link, swapping in the rewritten target when
/// it resolves through the rename map.
fn rewrite_capture(
    caps: &Captures,
    original_dir: &Path,
    final_dir: &Path,
    map: &RenameMap,
    changed: &mut usize,
) -> String {
    let target = &caps[2];
    let suffix = caps.get(3).map(|m| m.as_str()).unwrap_or("");
    match rewrite_target(target, original_dir, final_dir, map) {
        Some(new_target) if new_target != target => {
            *changed += 1;
            format!("{}{}{}", &caps[1], new_target, suffix)
        }
        _ => caps[0].to_string(),
    }
}

/// Maps one link target through the rename map.
///
/// `None` means the target is external, malformed, or not an entry the
/// pipeline tracked; in all three cases the link is left as it was.
fn rewrite_target(
    target: &str,
    original_dir: &Path,
    final_dir: &Path,
    map: &RenameMap,
) -> Option<String> {
    let target = target.trim();
    if target.is_empty()
        || EXTERNAL_PREFIXES
            .iter()
            .any(|prefix| target.starts_with(prefix))
    {
        return None;
    }

    let (path_part, fragment) = match target.find('#') {
        Some(pos) => (&target[..pos], &target[pos..]),
        None => (target, ""),
    };
    if path_part.is_empty() {
        return None;
    }

    let decoded = urlencoding::decode(path_part).ok()?;
    let resolved = normalize_components(&original_dir.join(decoded.as_ref()));
    let final_target = map.final_path(&resolved)?;

    let relative = pathdiff::diff_paths(final_target, final_dir)?;
    Some(format!("{}{}", encode_link_path(&relative), fragment))
}

/// Percent-encodes a relative path for use as a Markdown link target,
/// segment by segment so separators survive.
fn encode_link_path(path: &Path) -> String {
    path.components()
        .map(|component| {
            let name = component.as_os_str().to_string_lossy();
            if name == ".." {
                Cow::Borrowed("..")
            } else {
                Cow::Owned(urlencoding::encode(&name).into_owned())
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::ledger::RenameLedger;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn sample_map() -> RenameMap {
        let mut ledger = RenameLedger::new();
        for path in [
            "Home e82f1f46f47e4859aef48d9da4875832.md",
            "Tasks 8f2fb47d8d79400e96243c1c411716dc",
            "Tasks 8f2fb47d8d79400e96243c1c411716dc/Fix Bugs a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6.md",
            "Notes.md",
        ]
        .iter()
        {
            ledger.track(PathBuf::from(path));
        }
        ledger.record_rename(
            Path::new("Home e82f1f46f47e4859aef48d9da4875832.md"),
            Path::new("Home.md"),
        );
        ledger.record_rename(
            Path::new("Tasks 8f2fb47d8d79400e96243c1c411716dc"),
            Path::new("Tasks"),
        );
        ledger.record_rename(
            Path::new("Tasks/Fix Bugs a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6.md"),
            Path::new("Tasks/Fix Bugs.md"),
        );
        ledger.finalize()
    }

    #[test]
    fn rewrites_renamed_target() {
        let map = sample_map();
        let rewritten = rewrite_target(
            "Home%20e82f1f46f47e4859aef48d9da4875832.md",
            Path::new(""),
            Path::new(""),
            &map,
        );
        assert_eq!(rewritten.as_deref(), Some("Home.md"));
    }

    #[test]
    fn rewrites_target_through_collapsed_folder_rename() {
        let map = sample_map();
        let rewritten = rewrite_target(
            "Tasks%208f2fb47d8d79400e96243c1c411716dc/Fix%20Bugs%20a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6.md",
            Path::new(""),
            Path::new(""),
            &map,
        );
        assert_eq!(rewritten.as_deref(), Some("Tasks/Fix%20Bugs.md"));
    }

    #[test]
    fn resolves_relative_to_the_linking_file() {
        let map = sample_map();
        // A file inside the Tasks folder links up to Home.
        let rewritten = rewrite_target(
            "../Home%20e82f1f46f47e4859aef48d9da4875832.md",
            Path::new("Tasks 8f2fb47d8d79400e96243c1c411716dc"),
            Path::new("Tasks"),
            &map,
        );
        assert_eq!(rewritten.as_deref(), Some("../Home.md"));
    }

    #[test]
    fn external_targets_are_untouched() {
        let map = sample_map();
        for target in [
            "https://example.com/page",
            "http://example.com",
            "mailto:someone@example.com",
            "#heading",
        ] {
            assert_eq!(rewrite_target(target, Path::new(""), Path::new(""), &map), None);
        }
    }

    #[test]
    fn unmapped_targets_are_untouched() {
        let map = sample_map();
        assert_eq!(
            rewrite_target("Missing.md", Path::new(""), Path::new(""), &map),
            None
        );
    }

    #[test]
    fn fragments_survive_rewriting() {
        let map = sample_map();
        let rewritten = rewrite_target(
            "Home%20e82f1f46f47e4859aef48d9da4875832.md#section",
            Path::new(""),
            Path::new(""),
            &map,
        );
        assert_eq!(rewritten.as_deref(), Some("Home.md#section"));
    }

    #[test]
    fn rewriting_is_a_fixed_point() {
        let map = sample_map();
        let first = rewrite_target(
            "Tasks%208f2fb47d8d79400e96243c1c411716dc/Fix%20Bugs%20a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6.md",
            Path::new(""),
            Path::new(""),
            &map,
        )
        .unwrap();

        // The rewritten target resolves to an identity mapping (or no
        // mapping at all), so a second pass yields the same text.
        match rewrite_target(&first, Path::new(""), Path::new(""), &map) {
            Some(second) => assert_eq!(second, first),
            None => {}
        }
    }

    #[test]
    fn rewrites_inline_and_reference_definitions_in_files() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("Home.md"),
            "See [page](Page%20e82f1f46f47e4859aef48d9da4875832.md).\n\n\
             [ref]: Page%20e82f1f46f47e4859aef48d9da4875832.md\n",
        )
        .unwrap();

        let mut ledger = RenameLedger::new();
        ledger.track(PathBuf::from("Home.md"));
        ledger.track(PathBuf::from("Page e82f1f46f47e4859aef48d9da4875832.md"));
        ledger.record_rename(
            Path::new("Page e82f1f46f47e4859aef48d9da4875832.md"),
            Path::new("Page.md"),
        );
        let map = ledger.finalize();

        let rewritten = rewrite_links(tmp.path(), &map).unwrap();
        assert_eq!(rewritten, 2);

        let text = std::fs::read_to_string(tmp.path().join("Home.md")).unwrap();
        assert!(text.contains("[page](Page.md)"));
        assert!(text.contains("[ref]: Page.md"));
    }

    #[test]
    fn identity_mapping_produces_identical_text() {
        let map = sample_map();
        let rewritten = rewrite_target("Notes.md", Path::new(""), Path::new(""), &map);
        // The target resolves but nothing changed, so the caller keeps
        // the original text.
        assert_eq!(rewritten.as_deref(), Some("Notes.md"));
    }
}
