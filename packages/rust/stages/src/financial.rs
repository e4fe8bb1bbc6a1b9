//! FINANCIAL INSIGHTS: market snapshot, formatted metrics table and SWOT.
//!
//! The body carries two nested sub-sections, `FINANCIAL METRICS` (an aligned
//! `Metric Value` table) and `SWOT ANALYSIS`, which the composer parses into
//! structured fields. Everything before the first nested marker is free text.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use prelytics_report::{SectionHeader, render_nested};
use prelytics_shared::{PrelyticsError, Result, ScrapeConfig, Target};

use crate::Stage;
use crate::llm::{Prompt, TextGenerator};

// ---------------------------------------------------------------------------
// Symbol lookup
// ---------------------------------------------------------------------------

/// Built-in company name → ticker table (names upper-cased).
const KNOWN_SYMBOLS: &[(&str, &str)] = &[
    ("AMGN", "AMGN"),
    ("AMGEN", "AMGN"),
    ("REGENERON", "REGN"),
    ("BIOGEN", "BIIB"),
    ("MODERNA", "MRNA"),
    ("ELI LILLY", "LLY"),
    ("LILLY", "LLY"),
    ("SANOFI", "SNY"),
    ("ASTRAZENECA", "AZN"),
    ("TAKEDA", "TAK"),
    ("NOVO NORDISK", "NVO"),
    ("ROCHE", "RHHBY"),
    ("GSK", "GSK"),
    ("GLAXOSMITHKLINE", "GSK"),
    ("TEVA", "TEVA"),
    ("BAYER", "BAYRY"),
    ("NOVARTIS", "NVS"),
    ("GENMAB", "GMAB"),
    ("PFIZER", "PFE"),
    ("JOHNSON & JOHNSON", "JNJ"),
];

/// Resolve a ticker for `name`; `overrides` win over the built-in table.
pub fn lookup_symbol(name: &str, overrides: &BTreeMap<String, String>) -> Option<String> {
    let key = name.trim().to_uppercase();

    overrides
        .iter()
        .find(|(k, _)| k.to_uppercase() == key)
        .map(|(_, v)| v.clone())
        .or_else(|| {
            KNOWN_SYMBOLS
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        })
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Key figures for one listed company. Missing fields read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancialSnapshot {
    pub revenue: f64,
    pub net_income: f64,
    pub gross_margins: f64,
    pub ebitda_margins: f64,
    pub operating_margins: f64,
    pub profit_margins: f64,
    pub revenue_growth: f64,
    pub return_on_equity: f64,
    pub total_debt: f64,
    pub total_cash: f64,
    pub free_cashflow: f64,
    pub current_ratio: f64,
    pub quick_ratio: f64,
    pub debt_to_equity: f64,
}

impl FinancialSnapshot {
    /// Display rows in report order.
    pub fn metric_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Revenue", format_currency(self.revenue)),
            ("Net Income", format_currency(self.net_income)),
            ("Gross Margin (%)", format_percentage(self.gross_margins)),
            ("EBITDA Margin (%)", format_percentage(self.ebitda_margins)),
            ("Operating Margin (%)", format_percentage(self.operating_margins)),
            ("Profit Margin (%)", format_percentage(self.profit_margins)),
            ("Revenue Growth (%)", format_percentage(self.revenue_growth)),
            ("Return on Equity (%)", format_percentage(self.return_on_equity)),
            ("Free Cash Flow", format_currency(self.free_cashflow)),
            ("Total Debt", format_currency(self.total_debt)),
            ("Total Cash", format_currency(self.total_cash)),
            ("Current Ratio", format_ratio(self.current_ratio)),
            ("Quick Ratio", format_ratio(self.quick_ratio)),
            ("Debt-to-Equity", format_ratio(self.debt_to_equity)),
        ]
    }
}

/// Source of [`FinancialSnapshot`]s by ticker.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn snapshot(&self, symbol: &str) -> Result<FinancialSnapshot>;
}

/// `GET {base_url}/{SYMBOL}` returning a snapshot as JSON.
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    client: Client,
    base_url: String,
}

impl HttpSnapshotSource {
    pub fn new(base_url: &str, scrape: &ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(scrape.user_agent.as_str())
            .timeout(Duration::from_secs(scrape.timeout_secs))
            .build()
            .map_err(|e| PrelyticsError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    #[instrument(skip(self))]
    async fn snapshot(&self, symbol: &str) -> Result<FinancialSnapshot> {
        let url = format!("{}/{}", self.base_url, symbol.to_uppercase());
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PrelyticsError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PrelyticsError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .json::<FinancialSnapshot>()
            .await
            .map_err(|e| PrelyticsError::parse(format!("{url}: invalid snapshot: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// `$1.23B` / `$4.50M` / `$7.00K` / `$12.00`; zero is `N/A`.
pub fn format_currency(value: f64) -> String {
    if value == 0.0 {
        return "N/A".into();
    }
    let magnitude = value.abs();
    if magnitude >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if magnitude >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else if magnitude >= 1e3 {
        format!("${:.2}K", value / 1e3)
    } else {
        format!("${value:.2}")
    }
}

/// A fraction as a percentage: `0.652` → `65.20%`; zero is `N/A`.
pub fn format_percentage(value: f64) -> String {
    if value == 0.0 {
        "N/A".into()
    } else {
        format!("{:.2}%", value * 100.0)
    }
}

/// Two-decimal ratio; zero is `N/A`.
pub fn format_ratio(value: f64) -> String {
    if value == 0.0 {
        "N/A".into()
    } else {
        format!("{value:.2}")
    }
}

/// Render rows as a whitespace-aligned table under a `Metric Value` header.
pub fn render_metrics_table(rows: &[(&str, String)]) -> String {
    let width = rows
        .iter()
        .map(|(name, _)| name.len())
        .chain(std::iter::once("Metric".len()))
        .max()
        .unwrap_or_default();

    let mut out = format!("{:<width$}  Value", "Metric");
    for (name, value) in rows {
        out.push('\n');
        out.push_str(&format!("{name:<width$}  {value}"));
    }
    out
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

pub struct FinancialStage {
    snapshots: Option<Arc<dyn SnapshotSource>>,
    llm: Arc<dyn TextGenerator>,
    symbols: BTreeMap<String, String>,
}

impl FinancialStage {
    pub fn new(
        snapshots: Option<Arc<dyn SnapshotSource>>,
        llm: Arc<dyn TextGenerator>,
        symbols: BTreeMap<String, String>,
    ) -> Self {
        Self {
            snapshots,
            llm,
            symbols,
        }
    }
}

#[async_trait]
impl Stage for FinancialStage {
    fn section(&self) -> SectionHeader {
        SectionHeader::FinancialInsights
    }

    #[instrument(skip_all, fields(target = %target.name))]
    async fn gather(&self, target: &Target) -> Result<Option<String>> {
        let name = &target.name;

        let Some(symbol) = lookup_symbol(name, &self.symbols) else {
            debug!("no ticker known; treating as private");
            return Ok(Some(format!(
                "[Warning] {name} appears to be a private company. No public financial data available."
            )));
        };

        let Some(source) = &self.snapshots else {
            warn!(%symbol, "no snapshot source configured");
            return Ok(Some(format!(
                "[Warning] No financial data source is configured; cannot fetch {symbol} for {name}."
            )));
        };

        let snapshot = source.snapshot(&symbol).await?;
        let data = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| PrelyticsError::parse(format!("snapshot encoding failed: {e}")))?;

        let summary = self
            .llm
            .complete(&summary_prompt(name, &data))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "financial summary unavailable");
                "[Financial summary unavailable]".to_string()
            });

        let cagr = self
            .llm
            .complete(&cagr_prompt(name, &data))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "CAGR unavailable");
                "Not Available".to_string()
            });

        let swot = self
            .llm
            .complete(&swot_prompt(name, &data))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "SWOT unavailable");
                String::new()
            });

        let table = render_metrics_table(&snapshot.metric_rows());

        Ok(Some(format!(
            "{name} Financial Briefing:\n\n{summary}\n\nCAGR: {cagr}\n\n{}\n\n{}",
            render_nested(SectionHeader::FinancialMetrics, &table),
            render_nested(SectionHeader::SwotAnalysis, &swot),
        )))
    }
}

fn summary_prompt(name: &str, data: &str) -> Prompt {
    Prompt::new(format!(
        "You are a financial analyst reviewing data for {name}.\n\n\
         1. Revenue/profit trends\n\
         2. Growth/stability indicators\n\
         3. Debt or cash flow observations\n\
         4. Red flags or risks\n\n\
         Keep it crisp. Use • bullet points.\n\nData:\n{data}"
    ))
}

fn cagr_prompt(name: &str, data: &str) -> Prompt {
    Prompt::new(format!(
        "Calculate the Compound Annual Growth Rate (CAGR) for {name} from this financial data:\n\n\
         {data}\n\n\
         If the data is insufficient, answer exactly \"Not Available\". Answer in one line."
    ))
    .with_temperature(0.1)
}

fn swot_prompt(name: &str, data: &str) -> Prompt {
    Prompt::new(format!(
        "Act as a business strategist. Perform a SWOT analysis for {name} using the \
         following financial data, with 3 points per category:\n\n{data}\n\n\
         Format:\nStrengths:\n- ...\nWeaknesses:\n- ...\nOpportunities:\n- ...\nThreats:\n- ..."
    ))
}
