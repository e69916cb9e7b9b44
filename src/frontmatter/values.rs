// src/frontmatter/values.rs
//! Normalization of property keys and values.
//!
//! Notion renders dates long-form ("October 13, 2022 6:09 PM") and
//! decorates property names with emoji ("📌 Status"). Frontmatter wants
//! ISO 8601 dates and plain alphanumeric keys; values that are not dates
//! pass through verbatim, and emoji in *values* are preserved.

use chrono::{NaiveDate, NaiveDateTime};

/// Long-form formats Notion uses for date property values, with a time
/// component.
const NOTION_DATETIME_FORMATS: [&str; 3] = [
    "%B %d, %Y %I:%M %p",    // "October 13, 2022 6:09 PM"
    "%B %d, %Y %I:%M:%S %p", // "October 13, 2022 6:09:00 PM"
    "%b %d, %Y %I:%M %p",    // "Oct 13, 2022 6:09 PM"
];

/// Long-form date-only formats.
const NOTION_DATE_FORMATS: [&str; 2] = [
    "%B %d, %Y", // "October 13, 2022"
    "%b %d, %Y", // "Oct 13, 2022"
];

/// Rewrites a recognized long-form calendar date into ISO 8601
/// (`YYYY-MM-DD`, or `YYYY-MM-DDTHH:MM:SS` when a time is present).
/// Anything unrecognized passes through unchanged.
pub fn normalize_value(raw: &str) -> String {
    let value = raw.trim();

    for format in NOTION_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return dt.format("%Y-%m-%dT%H:%M:%S").to_string();
        }
    }
    for format in NOTION_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    value.to_string()
}

/// Removes emoji and decorative glyphs from a property key and collapses
/// the whitespace they leave behind. May return an empty string, in which
/// case the caller drops the property.
pub fn normalize_key(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !is_decorative(*c)).collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a character is an emoji or decorative symbol with no place in
/// a frontmatter field name.
fn is_decorative(c: char) -> bool {
    let cp = c as u32;
    matches!(cp,
        0x1F000..=0x1FFFF    // emoji, emoticons, supplemental pictographs
        | 0x2600..=0x27BF    // miscellaneous symbols and dingbats
        | 0x2B00..=0x2BFF    // arrows and stars (⭐)
        | 0x2190..=0x21FF    // arrows
        | 0x2300..=0x23FF    // technical symbols (⌛, ⏰)
        | 0xFE00..=0xFE0F    // variation selectors
        | 0x200D             // zero-width joiner
        | 0x20E3             // combining enclosing keycap
    )
}
