//! Analysis orchestration for Prelytics.
//!
//! Runs the configured stages for a target, assembles and composes the
//! report (`run_analysis`), and exports finished runs to disk.

pub mod export;
pub mod pipeline;

pub use export::{ExportResult, ExportedFile, RunManifest, export_run, read_manifest};
pub use pipeline::{AnalysisRun, ProgressReporter, SilentProgress, run_analysis, sha256_hex};
