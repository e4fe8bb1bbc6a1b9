//! Result composer: rendered document → [`ParsedReport`].

use prelytics_shared::ParsedReport;
use tracing::{debug, instrument};

use crate::document::SectionHeader;
use crate::extract::extract;
use crate::parse::{BulletRule, parse_bullets, parse_metrics, parse_swot};

/// Decompose a rendered report into structured fields.
///
/// Pure and infallible: a missing section yields the field's empty value. A
/// section holding its placeholder is parsed like any other body.
#[instrument(skip_all, fields(len = document.len()))]
pub fn compose(document: &str) -> ParsedReport {
    let section = |header: SectionHeader| section_body(document, header);

    let report = ParsedReport {
        financial_metrics: section(SectionHeader::FinancialMetrics)
            .map(parse_metrics)
            .unwrap_or_default(),
        swot_analysis: section(SectionHeader::SwotAnalysis)
            .map(parse_swot)
            .unwrap_or_default(),
        operational_signals: section(SectionHeader::OperationalSignals)
            .map(|body| parse_bullets(body, BulletRule::Marked))
            .unwrap_or_default(),
        competitor_analysis: section(SectionHeader::CompetitorAnalysis)
            .map(|body| parse_bullets(body, BulletRule::AnyLine))
            .unwrap_or_default(),
        client_intelligence: text(section(SectionHeader::ClientIntelligence)),
        product_analysis: text(section(SectionHeader::ProductAnalysis)),
        key_decision_makers: text(section(SectionHeader::KeyDecisionMakers)),
        raw_results: document.to_string(),
    };

    debug!(
        metrics = report.financial_metrics.len(),
        signals = report.operational_signals.len(),
        competitor_lines = report.competitor_analysis.len(),
        "report composed"
    );

    report
}

fn section_body(document: &str, header: SectionHeader) -> Option<&str> {
    let body = extract(document, header);
    if body.is_none() {
        debug!(%header, "section marker not found");
    }
    body
}

fn text(body: Option<&str>) -> String {
    body.unwrap_or_default().to_string()
}
