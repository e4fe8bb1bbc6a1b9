//! Shared types, error model, and configuration for Prelytics.
//!
//! This crate is the foundation depended on by all other Prelytics crates.
//! It provides:
//! - [`PrelyticsError`], the unified error type
//! - Domain types ([`Target`], [`ParsedReport`], [`MetricTable`], [`SwotAnalysis`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FinancialsConfig, LlmConfig, OperationsConfig, ReportConfig, ScrapeConfig,
    VendorConfig, config_dir, config_file_path, expand_home, init_config, load_config,
    load_config_from, resolve_api_key,
};
pub use error::{PrelyticsError, Result};
pub use types::{MetricTable, ParsedReport, SwotAnalysis, SwotCategory, Target};
