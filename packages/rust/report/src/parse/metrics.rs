//! Whitespace-aligned `Metric Value` table parser.

use prelytics_shared::MetricTable;
use tracing::debug;

/// Parse a metrics table body into an ordered name → value mapping.
///
/// For each row the first token that looks like a value (see
/// [`is_value_token`]) splits the row: tokens before it form the metric
/// name, tokens from it on form the value, both rejoined with single spaces.
/// A row whose value token comes first is stored under the empty name.
/// Header rows, separator rows and rows without a value token are skipped. A
/// repeated metric keeps its last value.
pub fn parse_metrics(body: &str) -> MetricTable {
    let mut table = MetricTable::default();

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() || is_separator_row(line) {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if is_header_row(&tokens) {
            continue;
        }

        match tokens.iter().position(|t| is_value_token(t)) {
            None => {
                debug!(line, "dropping metrics row without a value token");
            }
            Some(split) => {
                table.insert(tokens[..split].join(" "), tokens[split..].join(" "));
            }
        }
    }

    table
}

/// Whether a token can start a metric value.
///
/// Accepted: anything starting with `$`; a number ending in `%`, `B`, `M` or
/// `K` (`65.20%`, `1.2B`); a bare number or ratio (`1.25`, `3:1`, `1.5x`,
/// `-0.4`).
pub fn is_value_token(token: &str) -> bool {
    if token.starts_with('$') {
        return true;
    }

    if let Some(number) = token
        .strip_suffix('%')
        .or_else(|| token.strip_suffix('B'))
        .or_else(|| token.strip_suffix('M'))
        .or_else(|| token.strip_suffix('K'))
    {
        return is_numeric(number);
    }

    is_numeric(token) || token.strip_suffix('x').is_some_and(is_numeric)
}

fn is_numeric(token: &str) -> bool {
    let digits = token.trim_start_matches(['-', '+']);
    digits.chars().any(|c| c.is_ascii_digit())
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | ':'))
}

/// `Metric Value` column header, as printed above aligned tables.
fn is_header_row(tokens: &[&str]) -> bool {
    matches!(tokens, [a, b] if a.eq_ignore_ascii_case("metric") && b.eq_ignore_ascii_case("value"))
}

/// Rows made only of rule characters, e.g. `------  -----` or `|---|---|`.
fn is_separator_row(line: &str) -> bool {
    line.chars().any(|c| c == '-' || c == '=')
        && line
            .chars()
            .all(|c| matches!(c, '-' | '=' | '|' | '+' | ':') || c.is_whitespace())
}
