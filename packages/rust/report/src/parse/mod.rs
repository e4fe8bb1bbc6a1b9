//! Field parsers for extracted section bodies.
//!
//! Each parser is total: malformed lines are dropped, never reported.

mod bullets;
mod metrics;
mod swot;

pub use bullets::{BulletRule, parse_bullets};
pub use metrics::{is_value_token, parse_metrics};
pub use swot::parse_swot;

/// Strip a list prefix (`-`, `•`, or `<digits>.`) and return the remainder.
///
/// Numbered prefixes must not be followed by another digit, so a line such
/// as `1.5% growth` is not mistaken for item 1.
pub(crate) fn strip_list_prefix(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix('-').or_else(|| line.strip_prefix('•')) {
        return Some(rest.trim());
    }

    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix('.')?;
    if rest.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(rest.trim())
}

/// Whether a trimmed line starts with a `-` or `•` bullet.
pub(crate) fn has_bullet_mark(line: &str) -> bool {
    line.starts_with('-') || line.starts_with('•')
}
