// src/frontmatter/parser.rs
//! Property-block scanning.
//!
//! Notion writes page properties as plain `Key: Value` lines at the top
//! of each database entry, between the title heading and the body. The
//! format is context-sensitive (a `Key: Value`-shaped line in the body is
//! body text), so the scan is an explicit two-state machine: it stays in
//! the header while consecutive lines match the property grammar and
//! drops to the body at the first line that does not, blank lines and
//! headings included. Everything from that line onward is untouched.

/// The scanner's position in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Header,
    Body,
}

/// The outcome of scanning one Markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyBlock {
    /// The `# Title` heading preceding the properties, if present.
    pub title: Option<String>,
    /// Raw property lines, in document order. Keys are not yet
    /// normalized and may repeat; the synthesizer resolves collisions.
    pub properties: Vec<(String, String)>,
    /// The document from the first non-property line onward.
    pub body: String,
}

impl PropertyBlock {
    pub fn has_properties(&self) -> bool {
        !self.properties.is_empty()
    }
}

/// Scans the leading property block of a Markdown document.
///
/// A `# Title` first line is consumed (with any blank lines after it)
/// before property scanning starts; Notion always emits the page title
/// above the properties.
pub fn scan_property_block(text: &str) -> PropertyBlock {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut idx = 0;

    let mut title = None;
    if let Some(first) = lines.first() {
        if let Some(heading) = first.trim_end().strip_prefix("# ") {
            let heading = heading.trim();
            if !heading.is_empty() {
                title = Some(heading.to_string());
                idx = 1;
                while idx < lines.len() && lines[idx].trim().is_empty() {
                    idx += 1;
                }
            }
        }
    }

    let mut properties = Vec::new();
    let mut state = ScanState::Header;
    while idx < lines.len() && state == ScanState::Header {
        match parse_property_line(lines[idx]) {
            Some(property) => {
                properties.push(property);
                idx += 1;
            }
            None => state = ScanState::Body,
        }
    }

    // The blank separator after the block belongs to the block, not the body.
    if !properties.is_empty() {
        while idx < lines.len() && lines[idx].trim().is_empty() {
            idx += 1;
        }
    }

    PropertyBlock {
        title,
        properties,
        body: lines[idx..].join("\n"),
    }
}

/// Parses one `Key: Value` line. The key is non-empty, the separator is
/// a colon followed by a space (or end of line for an empty value), and
/// headings never match.
fn parse_property_line(line: &str) -> Option<(String, String)> {
    let line = line.trim_end();
    if line.starts_with('#') {
        return None;
    }

    let colon = line.find(':')?;
    let key = line[..colon].trim();
    if key.is_empty() {
        return None;
    }

    let rest = &line[colon + 1..];
    if !rest.is_empty() && !rest.starts_with(' ') {
        // "https://..." and similar colon-bearing text is not a property.
        return None;
    }

    Some((key.to_string(), rest.trim().to_string()))
}
