//! Application configuration for Prelytics.
//!
//! User config lives at `~/.prelytics/prelytics.toml`.
//! CLI flags override config file values, which override defaults.
//! Secrets are never stored here: `[llm].api_key_env` names the environment
//! variable the CLI reads once and hands to the stage constructors.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PrelyticsError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "prelytics.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".prelytics";

// ---------------------------------------------------------------------------
// Config structs (matching prelytics.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Text generation endpoint settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Website scraping settings.
    #[serde(default)]
    pub scrape: ScrapeConfig,

    /// Financial snapshot source settings.
    #[serde(default)]
    pub financials: FinancialsConfig,

    /// Operational signal sources.
    #[serde(default)]
    pub operations: OperationsConfig,

    /// The vendor on whose behalf competitor and product analyses are written.
    #[serde(default)]
    pub vendor: VendorConfig,

    /// Report layout and output.
    #[serde(default)]
    pub report: ReportConfig,
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of an OpenAI-compatible API (without `/chat/completions`).
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-request timeout.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_llm_base_url(),
            model: default_model(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_llm_timeout() -> u64 {
    60
}

/// `[scrape]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Per-page request timeout.
    #[serde(default = "default_scrape_timeout")]
    pub timeout_secs: u64,

    /// Maximum characters of scraped text handed to a prompt.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// User-Agent header for scraping requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_scrape_timeout(),
            max_chars: default_max_chars(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_scrape_timeout() -> u64 {
    15
}
fn default_max_chars() -> usize {
    6_000
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; Prelytics)".into()
}

/// `[financials]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialsConfig {
    /// Base URL of the snapshot service; `GET {base}/{SYMBOL}` returns JSON.
    /// When unset, the financial stage reports that no data source is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_base_url: Option<String>,

    /// Extra company-name → ticker mappings (names are matched upper-cased).
    #[serde(default)]
    pub symbols: BTreeMap<String, String>,
}

/// `[operations]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationsConfig {
    /// Job search URL; `{company}` is replaced with the URL-encoded name.
    #[serde(default = "default_job_search_url")]
    pub job_search_url: String,
}

impl Default for OperationsConfig {
    fn default() -> Self {
        Self {
            job_search_url: default_job_search_url(),
        }
    }
}

fn default_job_search_url() -> String {
    "https://www.linkedin.com/jobs/search?keywords={company}&location=Worldwide".into()
}

/// `[vendor]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorConfig {
    /// Vendor name used in competitor and product prompts.
    #[serde(default = "default_vendor_name")]
    pub name: String,

    /// Offering name → keywords matched against scraped client text.
    #[serde(default = "default_offerings")]
    pub offerings: BTreeMap<String, Vec<String>>,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            name: default_vendor_name(),
            offerings: default_offerings(),
        }
    }
}

fn default_vendor_name() -> String {
    "Agilisium".into()
}

fn default_offerings() -> BTreeMap<String, Vec<String>> {
    let table: [(&str, &[&str]); 5] = [
        (
            "cloud modernization",
            &["AWS", "Azure", "cloud migration", "data lakes"],
        ),
        (
            "data engineering",
            &["ETL", "data pipelines", "databricks", "big data"],
        ),
        (
            "AI/ML services",
            &["machine learning", "model training", "AI insights"],
        ),
        (
            "BI & analytics",
            &["Power BI", "dashboards", "visualization", "reporting"],
        ),
        (
            "governance & security",
            &["compliance", "data quality", "access control"],
        ),
    ];

    table
        .into_iter()
        .map(|(name, keywords)| {
            (
                name.to_string(),
                keywords.iter().map(|k| (*k).to_string()).collect(),
            )
        })
        .collect()
}

/// `[report]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Default directory for exported runs.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Run the leadership stage and emit a `KEY DECISION MAKERS` section.
    #[serde(default)]
    pub include_key_decision_makers: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            include_key_decision_makers: false,
        }
    }
}

fn default_output_dir() -> String {
    "~/prelytics-reports".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.prelytics/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PrelyticsError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.prelytics/prelytics.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PrelyticsError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| PrelyticsError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PrelyticsError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PrelyticsError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PrelyticsError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| PrelyticsError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}

/// Read the API key from the environment variable named in `[llm]`.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.llm.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(PrelyticsError::config(format!(
            "LLM API key not found. Set the {var_name} environment variable."
        ))),
    }
}
