//! SWOT (categorized list) parser.

use prelytics_shared::{SwotAnalysis, SwotCategory};
use tracing::debug;

use super::strip_list_prefix;

/// Parse a SWOT body into its four categories.
///
/// A line equal to a category label (colon optional, case-sensitive) moves
/// the cursor; a bulleted line appends to the current category. Lines that
/// are neither, and bullets seen before any category label, are dropped.
pub fn parse_swot(body: &str) -> SwotAnalysis {
    let mut swot = SwotAnalysis::default();
    let mut current: Option<SwotCategory> = None;

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let label = line.strip_suffix(':').unwrap_or(line);
        if let Some(category) = SwotCategory::from_label(label) {
            current = Some(category);
            continue;
        }

        match (strip_list_prefix(line), current) {
            (Some(item), Some(category)) if !item.is_empty() => {
                swot.items_mut(category).push(item.to_string());
            }
            (Some(_), Some(_)) => {}
            _ => debug!(line, "dropping SWOT line outside a category bullet"),
        }
    }

    swot
}
