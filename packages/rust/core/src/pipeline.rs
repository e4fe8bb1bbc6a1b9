//! End-to-end analysis run: target → stages → assembled document → report.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, instrument};
use uuid::Uuid;

use prelytics_report::{SectionHeader, StageOutputs, assemble, compose};
use prelytics_shared::{ParsedReport, Target};
use prelytics_stages::{Stage, run_stage};

/// Result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRun {
    /// Time-ordered run identifier.
    pub run_id: Uuid,
    pub target: Target,
    pub started_at: DateTime<Utc>,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
    /// Hex SHA-256 of `report.raw_results`.
    pub document_sha256: String,
    pub report: ParsedReport,
}

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called before a stage starts.
    fn stage_started(&self, section: SectionHeader, index: usize, total: usize);
    /// Called after a stage finishes; `produced` is false when it contributed nothing.
    fn stage_finished(&self, section: SectionHeader, produced: bool);
    /// Called when the run completes.
    fn done(&self, run: &AnalysisRun);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage_started(&self, _section: SectionHeader, _index: usize, _total: usize) {}
    fn stage_finished(&self, _section: SectionHeader, _produced: bool) {}
    fn done(&self, _run: &AnalysisRun) {}
}

/// Run every stage in order, then assemble and compose the report.
///
/// Stage failures never abort the run; the affected section falls back to
/// its placeholder.
#[instrument(skip_all, fields(target = %target.name, url = %target.url, stages = stages.len()))]
pub async fn run_analysis(
    target: &Target,
    stages: &[Box<dyn Stage>],
    progress: &dyn ProgressReporter,
) -> AnalysisRun {
    let start = Instant::now();
    let started_at = Utc::now();
    let run_id = Uuid::now_v7();

    info!(%run_id, "starting analysis");

    let mut outputs = StageOutputs::new();
    for (index, stage) in stages.iter().enumerate() {
        let section = stage.section();
        progress.stage_started(section, index + 1, stages.len());

        let output = run_stage(stage.as_ref(), target).await;
        progress.stage_finished(section, output.is_some());
        outputs.record(section, output);
    }

    let document = assemble(&outputs).render();
    let report = compose(&document);

    let run = AnalysisRun {
        run_id,
        target: target.clone(),
        started_at,
        elapsed: start.elapsed(),
        document_sha256: sha256_hex(&document),
        report,
    };

    info!(
        %run_id,
        elapsed_ms = run.elapsed.as_millis() as u64,
        metrics = run.report.financial_metrics.len(),
        "analysis complete"
    );

    progress.done(&run);
    run
}

/// Lower-case hex SHA-256 of `content`.
pub fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use prelytics_shared::{PrelyticsError, Result};

    use super::*;

    struct Canned(SectionHeader, Option<&'static str>);

    #[async_trait]
    impl Stage for Canned {
        fn section(&self) -> SectionHeader {
            self.0
        }

        async fn gather(&self, _target: &Target) -> Result<Option<String>> {
            Ok(self.1.map(String::from))
        }
    }

    struct Broken(SectionHeader);

    #[async_trait]
    impl Stage for Broken {
        fn section(&self) -> SectionHeader {
            self.0
        }

        async fn gather(&self, _target: &Target) -> Result<Option<String>> {
            Err(PrelyticsError::Network("connection refused".into()))
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl ProgressReporter for Recorder {
        fn stage_started(&self, section: SectionHeader, index: usize, total: usize) {
            self.0.lock().unwrap().push(format!("start {section} {index}/{total}"));
        }
        fn stage_finished(&self, section: SectionHeader, produced: bool) {
            self.0.lock().unwrap().push(format!("finish {section} {produced}"));
        }
        fn done(&self, _run: &AnalysisRun) {
            self.0.lock().unwrap().push("done".into());
        }
    }

    fn target() -> Target {
        Target::new("Acme", "https://acme.example").unwrap()
    }

    #[tokio::test]
    async fn failed_stage_degrades_to_placeholder() {
        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(Canned(SectionHeader::ClientIntelligence, Some("Acme makes widgets."))),
            Box::new(Broken(SectionHeader::CompetitorAnalysis)),
        ];

        let run = run_analysis(&target(), &stages, &SilentProgress).await;

        assert_eq!(run.report.client_intelligence, "Acme makes widgets.");
        assert_eq!(
            run.report.competitor_analysis,
            vec!["[No competitor report found]"]
        );
        assert!(
            run.report
                .raw_results
                .contains("==== COMPETITOR ANALYSIS ====\n[No competitor report found]")
        );
        assert_eq!(run.document_sha256, sha256_hex(&run.report.raw_results));
        assert_eq!(run.document_sha256.len(), 64);
    }

    #[tokio::test]
    async fn progress_sees_every_stage() {
        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(Canned(SectionHeader::ProductAnalysis, Some("Good fit"))),
            Box::new(Canned(SectionHeader::OperationalSignals, None)),
        ];
        let recorder = Recorder::default();

        run_analysis(&target(), &stages, &recorder).await;

        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![
                "start PRODUCT ANALYSIS 1/2",
                "finish PRODUCT ANALYSIS true",
                "start OPERATIONAL SIGNALS 2/2",
                "finish OPERATIONAL SIGNALS false",
                "done",
            ]
        );
    }

    #[tokio::test]
    async fn run_serializes_elapsed_as_millis() {
        let run = run_analysis(&target(), &[], &SilentProgress).await;
        let json = serde_json::to_value(&run).unwrap();
        assert!(json["elapsed"].is_u64());
        assert_eq!(json["target"]["name"], "Acme");

        let back: AnalysisRun = serde_json::from_value(json).unwrap();
        assert_eq!(back.run_id, run.run_id);
    }

    #[test]
    fn sha256_of_known_input() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
