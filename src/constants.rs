// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role. Reading these constants should tell you the story of
//! how a Notion export is shaped and how far the converter will follow it.

// ---------------------------------------------------------------------------
// Notion export format boundaries
// ---------------------------------------------------------------------------

/// Length of the hexadecimal identifier Notion appends to every exported
/// file and folder name.
pub const EMBEDDED_ID_LENGTH: usize = 32;

/// File name of the HTML index Notion places at the export root.
///
/// It duplicates the directory listing and has no Obsidian counterpart,
/// so it is removed unconditionally.
pub const EXPORT_INDEX_FILE: &str = "index.html";

/// Suffix distinguishing the complete CSV export of a database from the
/// filtered view export (`Tasks <id>_all.csv` vs `Tasks <id>.csv`).
pub const COMPLETE_CSV_SUFFIX: &str = "_all";

/// Header value of the first column in every Notion database CSV.
///
/// The match is case-insensitive and tolerates a leading byte-order mark.
/// A CSV whose first column is anything else is plain content, not a
/// database table.
pub const DATABASE_NAME_COLUMN: &str = "Name";

// ---------------------------------------------------------------------------
// Archive expansion boundaries
// ---------------------------------------------------------------------------

/// Maximum rounds of nested-archive expansion.
///
/// Notion wraps large exports one level deep (`Part-N.zip` inside the outer
/// zip). Eight rounds is far beyond anything Notion produces and bounds the
/// work on a maliciously nested archive.
pub const MAX_ARCHIVE_NESTING: usize = 8;

// ---------------------------------------------------------------------------
// Collision handling boundaries
// ---------------------------------------------------------------------------

/// Maximum numeric suffix tried when disambiguating a post-strip name
/// collision (`Home.md`, `Home (1).md`, ...).
pub const DISAMBIGUATION_LIMIT: usize = 1000;
