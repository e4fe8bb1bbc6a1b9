//! Full run through `run_analysis` with in-memory stages.

use async_trait::async_trait;

use prelytics_core::{SilentProgress, export_run, read_manifest, run_analysis};
use prelytics_report::{SectionHeader, compose, extract};
use prelytics_shared::{PrelyticsError, Result, Target};
use prelytics_stages::Stage;

struct Canned {
    section: SectionHeader,
    body: Option<&'static str>,
}

#[async_trait]
impl Stage for Canned {
    fn section(&self) -> SectionHeader {
        self.section
    }

    async fn gather(&self, _target: &Target) -> Result<Option<String>> {
        Ok(self.body.map(String::from))
    }
}

struct Unreachable(SectionHeader);

#[async_trait]
impl Stage for Unreachable {
    fn section(&self) -> SectionHeader {
        self.0
    }

    async fn gather(&self, target: &Target) -> Result<Option<String>> {
        Err(PrelyticsError::Network(format!("{}: connection refused", target.url)))
    }
}

fn canned(section: SectionHeader, body: Option<&'static str>) -> Box<dyn Stage> {
    Box::new(Canned { section, body })
}

fn scenario_stages() -> Vec<Box<dyn Stage>> {
    vec![
        canned(SectionHeader::ClientIntelligence, Some("Acme makes widgets.")),
        canned(
            SectionHeader::FinancialInsights,
            Some(
                "Acme Financial Briefing:\n\n\
                 ==== FINANCIAL METRICS ====\nRevenue $500.00M\n\
                 ==== SWOT ANALYSIS ====\nStrengths:\n- Strong brand",
            ),
        ),
        canned(SectionHeader::OperationalSignals, None),
        canned(SectionHeader::CompetitorAnalysis, Some("• CompetitorX: strong")),
        canned(SectionHeader::ProductAnalysis, Some("Good fit")),
    ]
}

fn target() -> Target {
    Target::new("Acme", "https://acme.example").unwrap()
}

#[tokio::test]
async fn scenario_produces_structured_report() {
    let run = run_analysis(&target(), &scenario_stages(), &SilentProgress).await;
    let report = &run.report;

    assert_eq!(report.financial_metrics.len(), 1);
    assert_eq!(report.financial_metrics.get("Revenue"), Some("$500.00M"));
    assert_eq!(report.swot_analysis.strengths, vec!["Strong brand"]);
    assert!(report.swot_analysis.weaknesses.is_empty());
    assert!(report.swot_analysis.opportunities.is_empty());
    assert!(report.swot_analysis.threats.is_empty());
    assert!(report.operational_signals.is_empty());
    assert_eq!(report.competitor_analysis, vec!["• CompetitorX: strong"]);
    assert_eq!(report.client_intelligence, "Acme makes widgets.");
    assert_eq!(report.product_analysis, "Good fit");
    assert_eq!(report.key_decision_makers, "");

    assert_eq!(
        extract(&report.raw_results, SectionHeader::OperationalSignals),
        Some("[No operational signals found]")
    );
}

#[tokio::test]
async fn sections_follow_canonical_order_regardless_of_stage_order() {
    let mut stages = scenario_stages();
    stages.reverse();

    let run = run_analysis(&target(), &stages, &SilentProgress).await;
    let doc = &run.report.raw_results;

    let positions: Vec<usize> = SectionHeader::TOP_LEVEL
        .into_iter()
        .filter(|h| h.is_required())
        .map(|h| doc.find(&h.marker()).expect("marker present"))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(!doc.contains(&SectionHeader::KeyDecisionMakers.marker()));
}

#[tokio::test]
async fn raw_results_recompose_identically() {
    let run = run_analysis(&target(), &scenario_stages(), &SilentProgress).await;
    assert_eq!(compose(&run.report.raw_results), run.report);
}

#[tokio::test]
async fn every_stage_failing_still_yields_a_report() {
    let stages: Vec<Box<dyn Stage>> = SectionHeader::TOP_LEVEL
        .into_iter()
        .map(|h| Box::new(Unreachable(h)) as Box<dyn Stage>)
        .collect();

    let run = run_analysis(&target(), &stages, &SilentProgress).await;

    assert!(run.report.financial_metrics.is_empty());
    assert!(run.report.swot_analysis.is_empty());
    assert!(run.report.operational_signals.is_empty());
    assert_eq!(
        run.report.client_intelligence,
        SectionHeader::ClientIntelligence.placeholder()
    );
    assert_eq!(
        run.report.competitor_analysis,
        vec![SectionHeader::CompetitorAnalysis.placeholder()]
    );
    assert_eq!(
        run.report.product_analysis,
        SectionHeader::ProductAnalysis.placeholder()
    );
    assert_eq!(
        run.report.key_decision_makers,
        SectionHeader::KeyDecisionMakers.placeholder()
    );
    for header in SectionHeader::TOP_LEVEL {
        assert_eq!(
            extract(&run.report.raw_results, header),
            Some(header.placeholder()),
            "{header}"
        );
    }
}

#[tokio::test]
async fn exported_run_is_readable() {
    let run = run_analysis(&target(), &scenario_stages(), &SilentProgress).await;
    let root = std::env::temp_dir().join(format!("prelytics-it-{}", run.run_id));

    let exported = export_run(&run, &root, env!("CARGO_PKG_VERSION")).unwrap();
    let manifest = read_manifest(&exported.run_dir).unwrap();

    assert_eq!(manifest.run_id, run.run_id);
    assert_eq!(manifest.document_sha256, run.document_sha256);
    assert_eq!(manifest.target.name, "Acme");

    std::fs::remove_dir_all(&root).ok();
}
