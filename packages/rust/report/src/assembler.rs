//! Report assembler.
//!
//! Takes stage outputs, substitutes placeholders for missing ones and lays
//! the sections out in the canonical order as an [`AssembledDocument`].

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, warn};

use crate::document::{AssembledDocument, Section, SectionHeader};

/// Runs of four or more `=`, which could pass for a delimiter.
static DELIMITER_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"={4,}").expect("delimiter run regex"));

/// Output of one stage: `None` (or blank text) when the stage produced nothing.
pub type StageOutput = Option<String>;

/// Stage outputs keyed by the section they fill.
#[derive(Debug, Clone, Default)]
pub struct StageOutputs {
    entries: IndexMap<SectionHeader, StageOutput>,
}

impl StageOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stage's output, replacing any earlier output for the header.
    pub fn record(&mut self, header: SectionHeader, output: StageOutput) {
        if !SectionHeader::TOP_LEVEL.contains(&header) {
            warn!(%header, "ignoring output for a nested section header");
            return;
        }
        self.entries.insert(header, output);
    }

    /// `Some(output)` if a stage ran for the header, `None` otherwise.
    pub fn get(&self, header: SectionHeader) -> Option<Option<&str>> {
        self.entries.get(&header).map(Option::as_deref)
    }
}

/// Assemble recorded stage outputs in canonical section order.
///
/// Required sections always appear (with a placeholder if no stage ran for
/// them); the optional `KEY DECISION MAKERS` section only when recorded.
pub fn assemble(outputs: &StageOutputs) -> AssembledDocument {
    let pairs = SectionHeader::TOP_LEVEL
        .into_iter()
        .filter_map(|header| match outputs.get(header) {
            Some(output) => Some((header, output)),
            None if header.is_required() => Some((header, None)),
            None => None,
        });

    assemble_sections(pairs)
}

/// Assemble an ordered list of `(header, output)` pairs, keeping their order.
///
/// A repeated header keeps its first occurrence; later ones are dropped.
pub fn assemble_sections<'a, I>(pairs: I) -> AssembledDocument
where
    I: IntoIterator<Item = (SectionHeader, Option<&'a str>)>,
{
    let mut sections: Vec<Section> = Vec::new();

    for (header, output) in pairs {
        if sections.iter().any(|s| s.header == header) {
            warn!(%header, "duplicate section header, keeping the first occurrence");
            continue;
        }

        let body = match output.map(|text| normalize_body(header, text)) {
            Some(body) if !body.is_empty() => body,
            _ => {
                debug!(%header, "no stage output, using placeholder");
                header.placeholder().to_string()
            }
        };

        sections.push(Section { header, body });
    }

    AssembledDocument { sections }
}

/// Trim a body and neutralize delimiter runs that are not permitted markers.
///
/// Only the nested markers of the owning header (see
/// [`SectionHeader::nested`]) survive as marker lines; every other run of
/// four or more `=` becomes the same number of `-`.
fn normalize_body(header: SectionHeader, text: &str) -> String {
    let allowed: Vec<String> = header.nested().iter().map(|h| h.marker()).collect();

    text.trim()
        .lines()
        .map(|line| {
            let trimmed = line.trim();
            if allowed.iter().any(|marker| marker == trimmed) {
                return trimmed.to_string();
            }
            DELIMITER_RUN_RE
                .replace_all(line, |caps: &regex::Captures| "-".repeat(caps[0].len()))
                .into_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_sections_get_placeholders() {
        let doc = assemble(&StageOutputs::new());
        let headers: Vec<_> = doc.sections().iter().map(|s| s.header).collect();
        assert_eq!(
            headers,
            vec![
                SectionHeader::ClientIntelligence,
                SectionHeader::FinancialInsights,
                SectionHeader::OperationalSignals,
                SectionHeader::CompetitorAnalysis,
                SectionHeader::ProductAnalysis,
            ]
        );
        for section in doc.sections() {
            assert_eq!(section.body, section.header.placeholder());
        }
    }

    #[test]
    fn canonical_order_regardless_of_record_order() {
        let mut outputs = StageOutputs::new();
        outputs.record(SectionHeader::KeyDecisionMakers, Some("• Jane Doe, CEO".into()));
        outputs.record(SectionHeader::ProductAnalysis, Some("Good fit".into()));
        outputs.record(SectionHeader::ClientIntelligence, Some("Acme".into()));

        let doc = assemble(&outputs);
        let headers: Vec<_> = doc.sections().iter().map(|s| s.header).collect();
        assert_eq!(headers.first(), Some(&SectionHeader::ClientIntelligence));
        assert_eq!(headers.last(), Some(&SectionHeader::KeyDecisionMakers));
        assert_eq!(headers.len(), 6);
    }

    #[test]
    fn blank_output_is_treated_as_absent() {
        let mut outputs = StageOutputs::new();
        outputs.record(SectionHeader::OperationalSignals, Some(" \n\t ".into()));
        let doc = assemble(&outputs);
        assert_eq!(
            doc.body(SectionHeader::OperationalSignals),
            Some("[No operational signals found]")
        );
    }

    #[test]
    fn rerecording_replaces_output() {
        let mut outputs = StageOutputs::new();
        outputs.record(SectionHeader::ProductAnalysis, Some("first".into()));
        outputs.record(SectionHeader::ProductAnalysis, Some("second".into()));
        assert_eq!(outputs.get(SectionHeader::ProductAnalysis), Some(Some("second")));
    }

    #[test]
    fn nested_headers_cannot_be_recorded_top_level() {
        let mut outputs = StageOutputs::new();
        outputs.record(SectionHeader::SwotAnalysis, Some("Strengths:".into()));
        assert_eq!(outputs.get(SectionHeader::SwotAnalysis), None);
    }

    #[test]
    fn duplicate_pairs_keep_first() {
        let doc = assemble_sections([
            (SectionHeader::ProductAnalysis, Some("one")),
            (SectionHeader::ProductAnalysis, Some("two")),
        ]);
        assert_eq!(doc.sections().len(), 1);
        assert_eq!(doc.body(SectionHeader::ProductAnalysis), Some("one"));
    }

    #[test]
    fn stray_delimiters_are_neutralized() {
        let doc = assemble_sections([(
            SectionHeader::ClientIntelligence,
            Some("Intro\n==========\n==== PRODUCT ANALYSIS ====\ntail"),
        )]);
        assert_eq!(
            doc.body(SectionHeader::ClientIntelligence),
            Some("Intro\n----------\n---- PRODUCT ANALYSIS ----\ntail")
        );
    }

    #[test]
    fn financial_body_keeps_nested_markers() {
        let body = "Summary\n\n  ==== FINANCIAL METRICS ====  \nRevenue $1B\n==== SWOT ANALYSIS ====\nStrengths:";
        let doc = assemble_sections([(SectionHeader::FinancialInsights, Some(body))]);
        assert_eq!(
            doc.body(SectionHeader::FinancialInsights),
            Some("Summary\n\n==== FINANCIAL METRICS ====\nRevenue $1B\n==== SWOT ANALYSIS ====\nStrengths:")
        );
    }

    #[test]
    fn nested_markers_outside_financials_are_neutralized() {
        let doc = assemble_sections([(
            SectionHeader::ProductAnalysis,
            Some("==== SWOT ANALYSIS ===="),
        )]);
        assert_eq!(
            doc.body(SectionHeader::ProductAnalysis),
            Some("---- SWOT ANALYSIS ----")
        );
    }
}
