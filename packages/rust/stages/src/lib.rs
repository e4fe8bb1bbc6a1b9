//! Report stages: the collaborators that gather one section each.
//!
//! Every stage fills exactly one top-level section. A stage that fails or
//! finds nothing contributes `None`; the assembler then substitutes the
//! section placeholder.

pub mod client_intel;
pub mod competitors;
pub mod financial;
pub mod leadership;
pub mod llm;
pub mod operations;
pub mod product;
pub mod scrape;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{Instrument, debug, info_span, warn};

use prelytics_report::{SectionHeader, StageOutput};
use prelytics_shared::{AppConfig, Result, Target};

pub use client_intel::ClientIntelligenceStage;
pub use competitors::CompetitorStage;
pub use financial::{
    FinancialSnapshot, FinancialStage, HttpSnapshotSource, SnapshotSource, lookup_symbol,
};
pub use leadership::LeadershipStage;
pub use llm::{ChatClient, Prompt, TextGenerator};
pub use operations::OperationsStage;
pub use product::ProductStage;
pub use scrape::WebsiteScraper;

/// One section-producing step of an analysis run.
#[async_trait]
pub trait Stage: Send + Sync {
    /// The top-level section this stage fills.
    fn section(&self) -> SectionHeader;

    /// Gather the section body. `Ok(None)` means "nothing to report".
    async fn gather(&self, target: &Target) -> Result<Option<String>>;
}

/// Run a stage, turning any failure into an absent output.
pub async fn run_stage(stage: &dyn Stage, target: &Target) -> StageOutput {
    let section = stage.section();
    let span = info_span!("stage", %section);

    match stage.gather(target).instrument(span).await {
        Ok(Some(body)) if !body.trim().is_empty() => {
            debug!(%section, chars = body.len(), "stage produced output");
            Some(body)
        }
        Ok(_) => {
            debug!(%section, "stage produced nothing");
            None
        }
        Err(e) => {
            warn!(%section, error = %e, "stage failed; section will use its placeholder");
            None
        }
    }
}

/// Build the stage list for a run from config and a resolved API key.
///
/// Stages share one chat client and one scraper. The key decision makers
/// stage is included only when `include_leadership` is set.
pub fn build_stages(
    config: &AppConfig,
    api_key: &str,
    include_leadership: bool,
) -> Result<Vec<Box<dyn Stage>>> {
    let llm: Arc<dyn TextGenerator> = Arc::new(ChatClient::new(&config.llm, api_key)?);
    let scraper = Arc::new(WebsiteScraper::new(&config.scrape)?);

    let snapshots = match &config.financials.snapshot_base_url {
        Some(base) => {
            let source: Arc<dyn SnapshotSource> =
                Arc::new(HttpSnapshotSource::new(base, &config.scrape)?);
            Some(source)
        }
        None => None,
    };

    let mut stages: Vec<Box<dyn Stage>> = vec![
        Box::new(ClientIntelligenceStage::new(scraper.clone(), llm.clone())),
        Box::new(FinancialStage::new(
            snapshots,
            llm.clone(),
            config.financials.symbols.clone(),
        )),
        Box::new(OperationsStage::new(
            scraper.clone(),
            llm.clone(),
            config.operations.clone(),
        )),
        Box::new(CompetitorStage::new(llm.clone(), config.vendor.name.clone())),
        Box::new(ProductStage::new(
            scraper.clone(),
            llm.clone(),
            config.vendor.clone(),
        )),
    ];

    if include_leadership {
        stages.push(Box::new(LeadershipStage::new(scraper, llm)));
    }

    Ok(stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prelytics_shared::PrelyticsError;

    struct Fixed(SectionHeader, Result<Option<String>>);

    #[async_trait]
    impl Stage for Fixed {
        fn section(&self) -> SectionHeader {
            self.0
        }

        async fn gather(&self, _target: &Target) -> Result<Option<String>> {
            match &self.1 {
                Ok(body) => Ok(body.clone()),
                Err(e) => Err(PrelyticsError::Generation(e.to_string())),
            }
        }
    }

    fn target() -> Target {
        Target::new("Acme", "https://acme.example").unwrap()
    }

    #[tokio::test]
    async fn run_stage_passes_output_through() {
        let stage = Fixed(SectionHeader::ProductAnalysis, Ok(Some("Good fit".into())));
        assert_eq!(run_stage(&stage, &target()).await.as_deref(), Some("Good fit"));
    }

    #[tokio::test]
    async fn run_stage_maps_errors_and_blanks_to_none() {
        let failing = Fixed(
            SectionHeader::CompetitorAnalysis,
            Err(PrelyticsError::Network("down".into())),
        );
        assert!(run_stage(&failing, &target()).await.is_none());

        let blank = Fixed(SectionHeader::CompetitorAnalysis, Ok(Some("  \n".into())));
        assert!(run_stage(&blank, &target()).await.is_none());
    }

    #[test]
    fn build_stages_covers_every_required_section() {
        let config = AppConfig::default();

        let stages = build_stages(&config, "sk-test", false).unwrap();
        let sections: Vec<_> = stages.iter().map(|s| s.section()).collect();
        for header in SectionHeader::TOP_LEVEL.into_iter().filter(|h| h.is_required()) {
            assert!(sections.contains(&header), "missing stage for {header}");
        }
        assert!(!sections.contains(&SectionHeader::KeyDecisionMakers));

        let with_leadership = build_stages(&config, "sk-test", true).unwrap();
        assert_eq!(
            with_leadership.last().map(|s| s.section()),
            Some(SectionHeader::KeyDecisionMakers)
        );
    }
}
