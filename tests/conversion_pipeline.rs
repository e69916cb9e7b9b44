// tests/conversion_pipeline.rs
//! End-to-end tests over a constructed Notion export archive: expansion,
//! schema resolution, frontmatter synthesis, normalization, link
//! rewriting and view generation in one run.

use notion2obsidian::{run_conversion, AppError, PipelineConfig};
use pretty_assertions::assert_eq;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

const WRAPPER: &str = "Export-1234abcd-12ab-34cd-56ef-1234567890ab";
const PAGE_ID: &str = "e82f1f46f47e4859aef48d9da4875832";
const DB_ID: &str = "8f2fb47d8d79400e96243c1c411716dc";
const ENTRY_ID: &str = "a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6";
const HEX_DIR: &str = "b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6e7";
const NOTE_ID: &str = "c3d4e5f6a7b8c9d0e1f2a3b4c5d6e7f8";

fn write_zip(path: &Path, entries: &[(String, String)]) {
    let file = fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(name.as_str(), options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

fn zip_tree(root: &Path, zip_path: &Path) {
    let mut entries = Vec::new();
    for entry in walk_files(root) {
        let rel = entry.strip_prefix(root).unwrap();
        let name = rel.to_string_lossy().replace('\\', "/");
        entries.push((name, fs::read_to_string(&entry).unwrap()));
    }
    write_zip(zip_path, &entries);
}

fn walk_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let mut children: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        children.sort();
        for child in children {
            if child.is_dir() {
                stack.push(child);
            } else {
                files.push(child);
            }
        }
    }
    files.sort();
    files
}

/// A small but complete export: wrapper folder, HTML index, a database
/// with a filtered/complete CSV pair and one entry, a hex-only container
/// folder, and cross-references between all of them.
fn sample_export(dir: &Path) -> PathBuf {
    let zip_path = dir.join("export.zip");
    let entries = vec![
        (
            format!("{WRAPPER}/index.html"),
            "<html><body>export index</body></html>".to_string(),
        ),
        (
            format!("{WRAPPER}/Home {PAGE_ID}.md"),
            format!(
                "# Home\n\nSee [Fix Bugs](Tasks%20{DB_ID}/Fix%20Bugs%20{ENTRY_ID}.md) \
                 and [Old Notes]({HEX_DIR}/Old%20Notes%20{NOTE_ID}.md).\n\n\
                 External: [site](https://example.com/page).\n"
            ),
        ),
        (
            format!("{WRAPPER}/Tasks {DB_ID}.csv"),
            "\u{feff}Name,📌 Status,Created\nFix Bugs,Done,\"February 14, 2026\"\n".to_string(),
        ),
        (
            format!("{WRAPPER}/Tasks {DB_ID}_all.csv"),
            "\u{feff}Name,📌 Status,Created\nFix Bugs,Done,\"February 14, 2026\"\n\
             Ship It,Started,\"March 1, 2026\"\n"
                .to_string(),
        ),
        (
            format!("{WRAPPER}/Tasks {DB_ID}/Fix Bugs {ENTRY_ID}.md"),
            format!(
                "# Fix Bugs\n\n📌 Status: Done\nCreated: February 14, 2026\n\n\
                 ## Notes\n\nBack to [Home](../Home%20{PAGE_ID}.md).\n"
            ),
        ),
        (
            format!("{WRAPPER}/{HEX_DIR}/Old Notes {NOTE_ID}.md"),
            "# Old Notes\n\nNothing to see.\n".to_string(),
        ),
    ];
    write_zip(&zip_path, &entries);
    zip_path
}

fn config(archive: PathBuf, output_dir: PathBuf) -> PipelineConfig {
    PipelineConfig {
        archive,
        output_dir,
        keep_all_csv: false,
        frontmatter: true,
        verbose: false,
    }
}

#[test]
fn converts_a_full_export() {
    let tmp = tempfile::tempdir().unwrap();
    let archive = sample_export(tmp.path());
    let vault = tmp.path().join("vault");

    let report = run_conversion(&config(archive, vault.clone())).unwrap();

    // The wrapper, the index and the hex-only folder are gone.
    assert!(report.wrapper_flattened);
    assert_eq!(report.artifacts_removed, 1);
    assert_eq!(report.folders_collapsed, 1);
    assert!(!vault.join(WRAPPER).exists());
    assert!(!vault.join("index.html").exists());
    assert!(!vault.join(HEX_DIR).exists());

    // Names are clean, children of the collapsed folder sit one level up.
    assert!(vault.join("Home.md").is_file());
    assert!(vault.join("Tasks/Fix Bugs.md").is_file());
    assert!(vault.join("Old Notes.md").is_file());

    // Exactly one CSV survives, without the `_all` suffix, carrying the
    // complete row set.
    assert_eq!(report.csv_deduplicated, 1);
    let csv = fs::read_to_string(vault.join("Tasks.csv")).unwrap();
    assert!(csv.contains("Ship It"));
    assert!(!vault.join(format!("Tasks {DB_ID}.csv")).exists());
    assert!(!vault.join(format!("Tasks {DB_ID}_all.csv")).exists());

    // The database entry gained an ordered frontmatter header; emoji are
    // stripped from keys and the date is ISO 8601.
    assert_eq!(report.frontmatter_written, 1);
    let entry = fs::read_to_string(vault.join("Tasks/Fix Bugs.md")).unwrap();
    assert!(entry.starts_with("---\n"));
    assert!(entry.contains("title: Fix Bugs\n"));
    assert!(entry.contains("Status: Done\n"));
    assert!(entry.contains("Created: 2026-02-14\n"));
    let status = entry.find("Status:").unwrap();
    let created = entry.find("Created:").unwrap();
    assert!(status < created);
    assert!(entry.contains("## Notes"));

    // Links follow the rename map; external URLs stay put.
    let home = fs::read_to_string(vault.join("Home.md")).unwrap();
    assert!(home.contains("[Fix Bugs](Tasks/Fix%20Bugs.md)"));
    assert!(home.contains("[Old Notes](Old%20Notes.md)"));
    assert!(home.contains("https://example.com/page"));
    assert!(entry.contains("[Home](../Home.md)"));

    // One view definition, filtered on the final folder path, columns in
    // first-seen order behind file.name.
    assert_eq!(report.views_emitted, 1);
    let base = fs::read_to_string(vault.join("Tasks.base")).unwrap();
    assert!(base.contains("file.inFolder(\"Tasks\")"));
    assert!(base.contains("file.ext == \"md\""));
    let name_pos = base.find("file.name").unwrap();
    let status_pos = base.find("- Status").unwrap();
    let created_pos = base.find("- Created").unwrap();
    assert!(name_pos < status_pos && status_pos < created_pos);
}

#[test]
fn retention_and_no_frontmatter_flags_are_honored() {
    let tmp = tempfile::tempdir().unwrap();
    let archive = sample_export(tmp.path());
    let vault = tmp.path().join("vault");

    let mut cfg = config(archive, vault.clone());
    cfg.keep_all_csv = true;
    cfg.frontmatter = false;
    let report = run_conversion(&cfg).unwrap();

    // Both CSV variants survive with their distinguishing names: the
    // filtered one is merely ID-stripped, the complete one keeps its
    // `_all` marker.
    assert_eq!(report.csv_deduplicated, 0);
    assert!(vault.join("Tasks.csv").is_file());
    assert!(vault
        .join(format!("Tasks {DB_ID}_all.csv"))
        .is_file());

    // No metadata headers, no views.
    assert_eq!(report.frontmatter_written, 0);
    assert_eq!(report.views_emitted, 0);
    let entry = fs::read_to_string(vault.join("Tasks/Fix Bugs.md")).unwrap();
    assert!(!entry.starts_with("---"));
    assert!(walk_files(&vault)
        .iter()
        .all(|p| p.extension().map(|e| e != "base").unwrap_or(true)));

    // Links still follow the renames that did happen.
    let home = fs::read_to_string(vault.join("Home.md")).unwrap();
    assert!(home.contains("[Fix Bugs](Tasks/Fix%20Bugs.md)"));
}

#[test]
fn occupied_output_directory_is_refused() {
    let tmp = tempfile::tempdir().unwrap();
    let archive = sample_export(tmp.path());
    let vault = tmp.path().join("vault");
    fs::create_dir_all(&vault).unwrap();
    fs::write(vault.join("precious.txt"), "do not touch").unwrap();

    let err = run_conversion(&config(archive, vault.clone())).unwrap_err();
    match err {
        AppError::OutputDirNotEmpty(path) => assert_eq!(path, vault),
        other => panic!("expected output-dir error, got {other}"),
    }

    // The pre-existing content is untouched.
    assert_eq!(
        fs::read_to_string(vault.join("precious.txt")).unwrap(),
        "do not touch"
    );
}

#[test]
fn conversion_is_idempotent_on_clean_trees() {
    let tmp = tempfile::tempdir().unwrap();
    let archive = sample_export(tmp.path());
    let first_vault = tmp.path().join("vault");
    run_conversion(&config(archive, first_vault.clone())).unwrap();

    // Re-archive the converted vault and convert again.
    let second_archive = tmp.path().join("roundtrip.zip");
    zip_tree(&first_vault, &second_archive);
    let second_vault = tmp.path().join("vault2");
    let report = run_conversion(&config(second_archive, second_vault.clone())).unwrap();

    // Nothing left to clean: no collapses, no renames, no link rewrites.
    assert_eq!(report.folders_collapsed, 0);
    assert_eq!(report.files_renamed, 0);
    assert_eq!(report.folders_renamed, 0);
    assert_eq!(report.links_rewritten, 0);

    // Identical trees, file by file. View definitions are regenerated
    // from observed frontmatter and a clean tree has none to observe, so
    // only their presence is compared, not their column list.
    let first: Vec<_> = walk_files(&first_vault)
        .into_iter()
        .map(|p| p.strip_prefix(&first_vault).unwrap().to_path_buf())
        .collect();
    let second: Vec<_> = walk_files(&second_vault)
        .into_iter()
        .map(|p| p.strip_prefix(&second_vault).unwrap().to_path_buf())
        .collect();
    assert_eq!(first, second);

    for rel in &first {
        if rel.extension().map(|e| e == "base").unwrap_or(false) {
            continue;
        }
        assert_eq!(
            fs::read_to_string(first_vault.join(rel)).unwrap(),
            fs::read_to_string(second_vault.join(rel)).unwrap(),
            "content drifted for {}",
            rel.display()
        );
    }
}

#[test]
fn zip_of_zips_exports_expand_transitively() {
    let tmp = tempfile::tempdir().unwrap();

    let part1 = tmp.path().join("Part-1.zip");
    write_zip(
        &part1,
        &[(format!("{WRAPPER}/Alpha {PAGE_ID}.md"), "# Alpha\n".to_string())],
    );
    let part2 = tmp.path().join("Part-2.zip");
    write_zip(
        &part2,
        &[(format!("{WRAPPER}/Beta {NOTE_ID}.md"), "# Beta\n".to_string())],
    );

    let outer = tmp.path().join("export.zip");
    let file = fs::File::create(&outer).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for part in [&part1, &part2] {
        writer
            .start_file(part.file_name().unwrap().to_str().unwrap(), options)
            .unwrap();
        writer.write_all(&fs::read(part).unwrap()).unwrap();
    }
    writer.finish().unwrap();

    let vault = tmp.path().join("vault");
    let report = run_conversion(&config(outer, vault.clone())).unwrap();

    assert_eq!(report.nested_archives, 2);
    assert!(vault.join("Alpha.md").is_file());
    assert!(vault.join("Beta.md").is_file());
    assert!(walk_files(&vault)
        .iter()
        .all(|p| p.extension().map(|e| e != "zip").unwrap_or(true)));
}
