// src/naming.rs
//! Name-level vocabulary of a Notion export.
//!
//! Everything here is a pure function over entry names: recognizing the
//! 32-hex-char identifier Notion appends to exported names, stripping it,
//! and classifying the container folders the export wraps content in.
//! File-system concerns live in `vault`; this module never touches disk.

use crate::constants::EMBEDDED_ID_LENGTH;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    // Matches the hex identifier appended after whitespace at the end of a
    // name stem: "Home e82f1f46f47e4859aef48d9da4875832" -> "Home".
    static ref TRAILING_EMBEDDED_ID: Regex =
        Regex::new(r"(?i)\s+[0-9a-f]{32}$").expect("trailing-id pattern is valid");

    // Matches a name that is nothing but a hex identifier. Notion uses such
    // folders as internal containers; they carry no readable label.
    static ref HEX_ONLY_NAME: Regex =
        Regex::new(r"(?i)^[0-9a-f]{32}$").expect("hex-only pattern is valid");

    // Matches the top-level Export-UUID wrapper folder.
    static ref EXPORT_WRAPPER: Regex = Regex::new(
        r"(?i)^Export-[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$",
    )
    .expect("export-wrapper pattern is valid");
}

/// The 32-hex-char token Notion embeds in exported file and folder names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmbeddedId(String);

impl EmbeddedId {
    /// Extracts the trailing embedded identifier from a name stem, if any.
    ///
    /// The extension must already be split off; `"Tasks 8f2f...dc"` yields
    /// the identifier, `"Tasks"` yields `None`.
    pub fn extract(stem: &str) -> Option<Self> {
        let token = TRAILING_EMBEDDED_ID.find(stem)?.as_str().trim_start();
        debug_assert_eq!(token.len(), EMBEDDED_ID_LENGTH);
        Some(Self(token.to_ascii_lowercase()))
    }

    #[allow(dead_code)] // Used by tests and library consumers
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmbeddedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Removes the trailing embedded identifier from a name, preserving the
/// file extension if present.
///
/// Stripping is idempotent: once no trailing identifier remains, the name
/// passes through unchanged. A name whose stem would become empty (the
/// identifier is all there is) is returned as-is; hex-only *folders* are
/// handled by collapsing, not renaming.
pub fn strip_embedded_id(name: &str) -> String {
    let (stem, ext) = split_extension(name);

    let mut cleaned = stem.to_string();
    loop {
        let next = TRAILING_EMBEDDED_ID.replace(&cleaned, "").trim_end().to_string();
        if next == cleaned {
            break;
        }
        cleaned = next;
    }
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        name.to_string()
    } else {
        format!("{}{}", cleaned, ext)
    }
}

/// Strips the embedded identifier and normalizes the name: literal `%20`
/// sequences (Notion occasionally leaves them in asset names) decode to
/// spaces, and surrounding whitespace is trimmed.
pub fn clean_entry_name(name: &str) -> String {
    let cleaned = strip_embedded_id(name);
    cleaned.replace("%20", " ").trim().to_string()
}

/// Whether a folder name consists solely of an embedded identifier, with
/// no readable label.
pub fn is_hex_only_name(name: &str) -> bool {
    HEX_ONLY_NAME.is_match(name)
}

/// Whether a folder name is the `Export-<uuid>` wrapper Notion puts around
/// an entire export.
pub fn is_export_wrapper(name: &str) -> bool {
    EXPORT_WRAPPER.is_match(name)
}

/// Splits a name into stem and extension at the last dot.
///
/// A leading dot (hidden files) does not count as an extension separator.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => (&name[..pos], &name[pos..]),
        _ => (name, ""),
    }
}
