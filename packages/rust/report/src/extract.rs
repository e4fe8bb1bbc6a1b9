//! Section extraction from a rendered report document.

use crate::document::{DELIMITER, SectionHeader, marker_for};

/// Body of `header`'s section, or `None` if its marker is absent.
///
/// The body runs from the end of the first `==== LABEL ====` marker up to the
/// next delimiter token (or end of document) and is returned trimmed.
/// Lookup is by the literal bracketed marker, so a label appearing as plain
/// text inside another body never matches.
pub fn extract(document: &str, header: SectionHeader) -> Option<&str> {
    extract_label(document, header.label())
}

/// Same as [`extract`] for an arbitrary label.
pub fn extract_label<'a>(document: &'a str, label: &str) -> Option<&'a str> {
    let marker = marker_for(label);
    let start = document.find(&marker)? + marker.len();
    let rest = &document[start..];
    let end = rest.find(DELIMITER).unwrap_or(rest.len());
    Some(rest[..end].trim())
}
