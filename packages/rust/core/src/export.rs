//! Run export: writes a finished run to `<out>/<run_id>/`.
//!
//! ```text
//! <out>/<run_id>/
//! ├── report.json   ParsedReport
//! ├── report.txt    assembled document (raw_results)
//! └── run.json      run manifest with file checksums
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use prelytics_shared::{PrelyticsError, Result, Target};

use crate::pipeline::{AnalysisRun, sha256_hex};

/// Checksum entry for one exported file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFile {
    pub filename: String,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Contents of `run.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: Uuid,
    pub target: Target,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub document_sha256: String,
    pub tool_version: String,
    pub files: Vec<ExportedFile>,
}

/// Result of a successful export.
#[derive(Debug, Clone)]
pub struct ExportResult {
    /// The run directory.
    pub run_dir: PathBuf,
    pub manifest: RunManifest,
}

/// Write `run` under `output_root`, each file atomically.
#[instrument(skip_all, fields(run_id = %run.run_id, root = %output_root.display()))]
pub fn export_run(run: &AnalysisRun, output_root: &Path, tool_version: &str) -> Result<ExportResult> {
    let run_dir = output_root.join(run.run_id.to_string());
    std::fs::create_dir_all(&run_dir).map_err(|e| PrelyticsError::io(&run_dir, e))?;

    let report_json = to_json(&run.report)?;
    let files = vec![
        write_atomic(&run_dir, "report.json", &report_json)?,
        write_atomic(&run_dir, "report.txt", &run.report.raw_results)?,
    ];

    let manifest = RunManifest {
        run_id: run.run_id,
        target: run.target.clone(),
        started_at: run.started_at,
        elapsed_ms: run.elapsed.as_millis() as u64,
        document_sha256: run.document_sha256.clone(),
        tool_version: tool_version.to_string(),
        files,
    };
    write_atomic(&run_dir, "run.json", &to_json(&manifest)?)?;

    info!(path = %run_dir.display(), "run exported");

    Ok(ExportResult { run_dir, manifest })
}

/// Read back an exported manifest.
pub fn read_manifest(run_dir: &Path) -> Result<RunManifest> {
    let path = run_dir.join("run.json");
    let content = std::fs::read_to_string(&path).map_err(|e| PrelyticsError::io(&path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| PrelyticsError::validation(format!("invalid run.json: {e}")))
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| PrelyticsError::validation(format!("JSON serialization failed: {e}")))
}

/// Write to a dot-prefixed temp file, then rename over the target.
fn write_atomic(dir: &Path, filename: &str, content: &str) -> Result<ExportedFile> {
    let target = dir.join(filename);
    let temp = dir.join(format!(".{filename}.tmp"));

    std::fs::write(&temp, content).map_err(|e| PrelyticsError::io(&temp, e))?;
    std::fs::rename(&temp, &target).map_err(|e| PrelyticsError::io(&target, e))?;

    debug!(file = %filename, size = content.len(), "wrote file");

    Ok(ExportedFile {
        filename: filename.to_string(),
        sha256: sha256_hex(content),
        size_bytes: content.len(),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use prelytics_shared::ParsedReport;

    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("prelytics-export-test-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample_run() -> AnalysisRun {
        let document = "\n==== CLIENT INTELLIGENCE REPORT ====\nAcme makes widgets.\n".to_string();
        let mut report = ParsedReport {
            client_intelligence: "Acme makes widgets.".into(),
            raw_results: document.clone(),
            ..ParsedReport::default()
        };
        report.financial_metrics.insert("Revenue", "$500.00M");

        AnalysisRun {
            run_id: Uuid::now_v7(),
            target: Target::new("Acme", "https://acme.example").unwrap(),
            started_at: Utc::now(),
            elapsed: Duration::from_millis(1_250),
            document_sha256: sha256_hex(&document),
            report,
        }
    }

    #[test]
    fn export_writes_all_files() {
        let root = temp_dir();
        let run = sample_run();

        let result = export_run(&run, &root, "0.1.0").unwrap();

        assert_eq!(result.run_dir, root.join(run.run_id.to_string()));
        for name in ["report.json", "report.txt", "run.json"] {
            assert!(result.run_dir.join(name).exists(), "{name} missing");
        }
        assert!(!result.run_dir.join(".report.json.tmp").exists());

        let txt = std::fs::read_to_string(result.run_dir.join("report.txt")).unwrap();
        assert_eq!(txt, run.report.raw_results);

        let json = std::fs::read_to_string(result.run_dir.join("report.json")).unwrap();
        let back: ParsedReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, run.report);

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn manifest_checksums_match_files() {
        let root = temp_dir();
        let run = sample_run();

        let result = export_run(&run, &root, "0.1.0").unwrap();
        let manifest = read_manifest(&result.run_dir).unwrap();

        assert_eq!(manifest, result.manifest);
        assert_eq!(manifest.elapsed_ms, 1_250);
        assert_eq!(manifest.files.len(), 2);
        for file in &manifest.files {
            let content = std::fs::read_to_string(result.run_dir.join(&file.filename)).unwrap();
            assert_eq!(file.sha256, sha256_hex(&content));
            assert_eq!(file.size_bytes, content.len());
        }
        let txt = manifest.files.iter().find(|f| f.filename == "report.txt").unwrap();
        assert_eq!(txt.sha256, run.document_sha256);

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn invalid_manifest_is_rejected() {
        let root = temp_dir();
        std::fs::write(root.join("run.json"), "{not json").unwrap();
        let err = read_manifest(&root).unwrap_err();
        assert!(err.to_string().contains("invalid run.json"));
        std::fs::remove_dir_all(&root).ok();
    }
}
